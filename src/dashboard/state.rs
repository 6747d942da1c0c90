use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    config::ELECTRICAL_FIELDS,
    request::{CorrelationOutcome, CorrelationQuery},
    sequence::{RequestSequence, RequestToken},
};

use super::{
    table::CorrelationTable,
    time_range::{TimeBound, TimeRange},
};

pub const SELECT_MACHINE_PLACEHOLDER: &str = "-- Select a machine --";
pub const MACHINES_FAILED_PLACEHOLDER: &str = "⚠️ Failed to load machines";
pub const FIELDS_FAILED_MESSAGE: &str = "Error fetching machine parameters.";
pub const SELECT_FIELDS_MESSAGE: &str =
    "Please select at least one machine field and one electrical parameter.";
pub const RANGE_ORDER_MESSAGE: &str = "The start time must be before the stop time.";
pub const ANALYZING_MESSAGE: &str = "Analyzing correlations...";
pub const NO_DATA_MESSAGE: &str = "No correlation data found.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MachineList {
    Loaded(Vec<String>),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Options of the machine selector. `None` while the list is still loading.
pub fn machine_options(machines: Option<&MachineList>) -> Vec<SelectOption> {
    let placeholder = |label: &str| SelectOption {
        value: String::new(),
        label: label.to_string(),
    };

    match machines {
        Some(MachineList::Failed) => vec![placeholder(MACHINES_FAILED_PLACEHOLDER)],
        Some(MachineList::Loaded(machines)) => std::iter::once(placeholder(SELECT_MACHINE_PLACEHOLDER))
            .chain(machines.iter().map(|machine| SelectOption {
                value: machine.clone(),
                label: machine.clone(),
            }))
            .collect(),
        None => vec![placeholder(SELECT_MACHINE_PLACEHOLDER)],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldChoice {
    pub name: String,
    pub label: String,
    pub checked: bool,
}

impl FieldChoice {
    fn unchecked(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            checked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Machine,
    Electrical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Idle,
    LoadingFields,
    FieldsUnavailable,
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Results {
    #[default]
    Hidden,
    Message(String),
    Analyzing,
    Table(CorrelationTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldsRequest {
    pub token: RequestToken,
    pub machine: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub token: RequestToken,
    pub query: CorrelationQuery,
}

/// Everything the page shows, changed only through the operations below.
///
/// Operations that need the network return the request to perform; its
/// result is fed back with the token it was issued with, so a response
/// overtaken by a newer request is dropped.
#[derive(Debug, Default)]
pub struct Dashboard {
    machine: Option<String>,
    stage: Stage,
    machine_fields: Vec<FieldChoice>,
    electrical_fields: Vec<FieldChoice>,
    time_range: TimeRange,
    results: Results,
    fields_sequence: RequestSequence,
    analysis_sequence: RequestSequence,
}

impl Dashboard {
    pub fn machine(&self) -> Option<&str> {
        self.machine.as_deref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn fields(&self, group: FieldGroup) -> &[FieldChoice] {
        match group {
            FieldGroup::Machine => &self.machine_fields,
            FieldGroup::Electrical => &self.electrical_fields,
        }
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn results(&self) -> &Results {
        &self.results
    }

    /// Field lists, time selection and the analyze action.
    pub fn sections_visible(&self) -> bool {
        self.stage == Stage::Ready
    }

    pub fn select_machine(&mut self, machine: &str) -> Option<FieldsRequest> {
        self.results = Results::Hidden;
        self.machine_fields.clear();
        self.electrical_fields.clear();
        self.time_range = TimeRange::default();
        self.analysis_sequence.invalidate();

        if machine.is_empty() {
            self.machine = None;
            self.stage = Stage::Idle;
            self.fields_sequence.invalidate();
            return None;
        }

        self.machine = Some(machine.to_string());
        self.stage = Stage::LoadingFields;

        Some(FieldsRequest {
            token: self.fields_sequence.issue(),
            machine: machine.to_string(),
        })
    }

    pub fn fields_loaded(&mut self, token: RequestToken, fields: Result<Vec<String>>) {
        if !self.fields_sequence.is_latest(token) {
            debug!("discarding stale machine fields response");
            return;
        }

        match fields {
            Ok(fields) => {
                self.machine_fields = fields
                    .iter()
                    .map(|field| FieldChoice::unchecked(field, field))
                    .collect();
                self.electrical_fields = ELECTRICAL_FIELDS
                    .iter()
                    .map(|(name, label)| FieldChoice::unchecked(name, label))
                    .collect();
                self.stage = Stage::Ready;
            }
            Err(err) => {
                error!(machine = self.machine.as_deref(), "machine fields request error: {err}");
                self.stage = Stage::FieldsUnavailable;
                self.results = Results::Message(FIELDS_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub fn set_field_checked(&mut self, group: FieldGroup, name: &str, checked: bool) {
        let fields = match group {
            FieldGroup::Machine => &mut self.machine_fields,
            FieldGroup::Electrical => &mut self.electrical_fields,
        };

        if let Some(field) = fields.iter_mut().find(|field| field.name == name) {
            field.checked = checked;
        }
    }

    pub fn set_start(&mut self, start: TimeBound) {
        self.time_range.start = start;
    }

    pub fn set_stop(&mut self, stop: TimeBound) {
        self.time_range.stop = stop;
    }

    pub fn analyze(&mut self) -> Option<AnalysisRequest> {
        let machine = self.machine.clone()?;

        let machine_fields = checked_names(&self.machine_fields);
        let energy_fields = checked_names(&self.electrical_fields);

        if machine_fields.is_empty() || energy_fields.is_empty() {
            self.results = Results::Message(SELECT_FIELDS_MESSAGE.to_string());
            return None;
        }

        if !self.time_range.is_ordered() {
            self.results = Results::Message(RANGE_ORDER_MESSAGE.to_string());
            return None;
        }

        self.results = Results::Analyzing;

        Some(AnalysisRequest {
            token: self.analysis_sequence.issue(),
            query: CorrelationQuery {
                machine,
                machine_fields,
                energy_fields,
                start: self.time_range.start.to_flux(),
                stop: self.time_range.stop.to_flux(),
            },
        })
    }

    pub fn analysis_finished(&mut self, token: RequestToken, outcome: Result<CorrelationOutcome>) {
        if !self.analysis_sequence.is_latest(token) {
            debug!("discarding stale correlation response");
            return;
        }

        self.results = match outcome {
            Ok(CorrelationOutcome::Matrix(matrix)) => {
                Results::Table(CorrelationTable::from_matrix(&matrix))
            }
            Ok(CorrelationOutcome::NoData) => Results::Message(NO_DATA_MESSAGE.to_string()),
            Ok(CorrelationOutcome::Rejected(detail)) => {
                error!("correlation request rejected: {detail}");
                Results::Message(format!("Error fetching correlation data: {detail}"))
            }
            Err(err) => {
                error!("correlation request error: {err}");
                Results::Message(format!("Error fetching correlation data: {err}"))
            }
        };
    }
}

fn checked_names(fields: &[FieldChoice]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| field.checked)
        .map(|field| field.name.clone())
        .collect()
}
