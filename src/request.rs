use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::{API_URL, ENERGY_DEVICE},
    dashboard::table::CorrelationMatrix,
    types::{CorrelationResponse, ErrorBody, MachineFieldsResponse, MachinesResponse},
};

pub const MACHINES_PATH: &str = "/get_machines";
pub const MACHINE_FIELDS_PATH: &str = "/get_machine_fields";
pub const CORRELATION_PATH: &str = "/machine_energy_correlation";

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationQuery {
    pub machine: String,
    pub machine_fields: Vec<String>,
    pub energy_fields: Vec<String>,
    pub start: String,
    pub stop: String,
}

impl CorrelationQuery {
    /// Array parameters repeat their key, as the service expects.
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("machine_device", self.machine.as_str())];
        pairs.extend(
            self.machine_fields
                .iter()
                .map(|field| ("machine_fields", field.as_str())),
        );
        pairs.push(("energy_device", ENERGY_DEVICE));
        pairs.extend(
            self.energy_fields
                .iter()
                .map(|field| ("energy_fields", field.as_str())),
        );
        pairs.push(("start", self.start.as_str()));
        pairs.push(("stop", self.stop.as_str()));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CorrelationOutcome {
    Matrix(CorrelationMatrix),
    NoData,
    /// Non-success status, with the service's detail or the status reason.
    Rejected(String),
}

fn endpoint(path: &str) -> Result<Url> {
    let url = format!("{}{path}", API_URL.trim_end_matches('/'));
    Url::parse(&url).with_context(|| format!("invalid endpoint url `{url}`"))
}

pub fn machines_url() -> Result<Url> {
    endpoint(MACHINES_PATH)
}

pub fn machine_fields_url(machine: &str) -> Result<Url> {
    let mut url = endpoint(MACHINE_FIELDS_PATH)?;
    url.query_pairs_mut().append_pair("machine_name", machine);
    Ok(url)
}

pub fn correlation_url(query: &CorrelationQuery) -> Result<Url> {
    let mut url = endpoint(CORRELATION_PATH)?;
    url.query_pairs_mut().extend_pairs(query.to_pairs());
    Ok(url)
}

pub async fn fetch_machines() -> Result<Vec<String>> {
    let response: MachinesResponse = get_json(machines_url()?).await?;
    Ok(response.machines)
}

pub async fn fetch_machine_fields(machine: &str) -> Result<Vec<String>> {
    let response: MachineFieldsResponse = get_json(machine_fields_url(machine)?).await?;
    Ok(response.fields)
}

pub async fn fetch_correlations(query: &CorrelationQuery) -> Result<CorrelationOutcome> {
    let url = correlation_url(query)?;
    debug!(%url, "requesting correlations");

    let response = reqwest::Client::new().get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    interpret_correlation_response(status, &body)
}

async fn get_json<T: DeserializeOwned>(url: Url) -> Result<T> {
    debug!(%url, "GET");

    let response = reqwest::Client::new()
        .get(url)
        .send()
        .await?
        .error_for_status()?;

    response.json().await.map_err(Into::into)
}

pub fn interpret_correlation_response(status: StatusCode, body: &str) -> Result<CorrelationOutcome> {
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| status.as_str().to_string(), ToString::to_string)
            });

        return Ok(CorrelationOutcome::Rejected(detail));
    }

    let response: CorrelationResponse =
        serde_json::from_str(body).context("malformed correlation response")?;

    Ok(CorrelationMatrix::from_json(&response.correlations)
        .map_or(CorrelationOutcome::NoData, CorrelationOutcome::Matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> CorrelationQuery {
        CorrelationQuery {
            machine: "prusa-mk4-1".to_string(),
            machine_fields: vec!["temp_nozzle".to_string(), "temp_bed".to_string()],
            energy_fields: vec!["apower".to_string(), "voltage".to_string()],
            start: "-1h".to_string(),
            stop: "now()".to_string(),
        }
    }

    #[test]
    fn array_parameters_repeat_their_key() {
        let url = correlation_url(&query()).unwrap();

        assert_eq!(url.path(), CORRELATION_PATH);
        assert_eq!(
            url.query(),
            Some(
                "machine_device=prusa-mk4-1\
                 &machine_fields=temp_nozzle&machine_fields=temp_bed\
                 &energy_device=SPPS-04\
                 &energy_fields=apower&energy_fields=voltage\
                 &start=-1h&stop=now%28%29"
            )
        );
    }

    #[test]
    fn machine_names_are_encoded() {
        let url = machine_fields_url("mill #2 & co").unwrap();
        assert_eq!(url.query(), Some("machine_name=mill+%232+%26+co"));
    }

    #[test]
    fn machines_url_has_no_query() {
        let url = machines_url().unwrap();
        assert_eq!(url.path(), MACHINES_PATH);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn rejected_response_uses_detail() {
        let outcome =
            interpret_correlation_response(StatusCode::BAD_REQUEST, r#"{"detail":"bad range"}"#)
                .unwrap();
        assert_eq!(outcome, CorrelationOutcome::Rejected("bad range".to_string()));
    }

    #[test]
    fn rejected_response_falls_back_to_status_text() {
        let outcome =
            interpret_correlation_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>").unwrap();
        assert_eq!(
            outcome,
            CorrelationOutcome::Rejected("Internal Server Error".to_string())
        );

        let outcome = interpret_correlation_response(StatusCode::BAD_GATEWAY, "{}").unwrap();
        assert_eq!(outcome, CorrelationOutcome::Rejected("Bad Gateway".to_string()));
    }

    #[test]
    fn empty_correlations_are_no_data() {
        for body in [
            r#"{"correlations":{}}"#,
            r#"{"correlations":null}"#,
            r#"{"correlations":[]}"#,
            "{}",
        ] {
            let outcome = interpret_correlation_response(StatusCode::OK, body).unwrap();
            assert_eq!(outcome, CorrelationOutcome::NoData, "body: {body}");
        }
    }

    #[test]
    fn successful_response_yields_matrix() {
        let outcome = interpret_correlation_response(
            StatusCode::OK,
            r#"{"correlations":{"temp_bed":{"apower":0.5}}}"#,
        )
        .unwrap();

        let matrix = match outcome {
            CorrelationOutcome::Matrix(matrix) => matrix,
            outcome => panic!("expected a matrix, got {outcome:?}"),
        };
        assert_eq!(matrix.rows[0].field, "temp_bed");
        assert_eq!(matrix.rows[0].values, [("apower".to_string(), Some(0.5))]);
    }

    #[test]
    fn unparseable_success_body_is_an_error() {
        assert!(interpret_correlation_response(StatusCode::OK, "not json").is_err());
    }
}
