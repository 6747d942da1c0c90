use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachinesResponse {
    pub machines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineFieldsResponse {
    pub fields: Vec<String>,
}

/// Body of `/machine_energy_correlation`.
///
/// `correlations` is kept as raw JSON: a missing or malformed matrix is a
/// "no data" result rather than a parse failure, and the object keeps the
/// order the service sent it in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorrelationResponse {
    #[serde(default)]
    pub correlations: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Value,
}

impl ErrorBody {
    /// Human readable form of `detail`, if the service sent a non-empty one.
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Value::Null => None,
            Value::String(detail) if detail.is_empty() => None,
            Value::String(detail) => Some(detail.clone()),
            detail => Some(detail.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_string_is_used_verbatim() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"bad range"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("bad range"));
    }

    #[test]
    fn structured_error_detail_is_rendered_as_json() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":[{"loc":["query","start"]}]}"#).unwrap();
        assert_eq!(
            body.message().as_deref(),
            Some(r#"[{"loc":["query","start"]}]"#)
        );
    }

    #[test]
    fn missing_or_empty_detail_has_no_message() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.message(), None);

        let body: ErrorBody = serde_json::from_str(r#"{"detail":""}"#).unwrap();
        assert_eq!(body.message(), None);
    }
}
