//! Persisted flow record: current step, accumulated data, edit flag

use serde::{Deserialize, Deserializer, Serialize};

use super::step::StepId;

/// How far back transactions are imported for the assigned card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartDateOption {
    FromBeginning,
    Custom,
}

/// Data accumulated across steps.
///
/// The shape belongs to the step collaborators; the controller only stores,
/// merges and clears it. Every field is optional so a value doubles as a
/// merge patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_option: Option<StartDateOption>,
    /// ISO date (YYYY-MM-DD), only meaningful with `StartDateOption::Custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
}

impl FlowData {
    /// Overwrite the fields `patch` sets, keep the rest
    pub fn merge(&mut self, patch: FlowData) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.email, patch.email);
        take(&mut self.bank_name, patch.bank_name);
        take(&mut self.card_number, patch.card_number);
        take(&mut self.encrypted_card_number, patch.encrypted_card_number);
        take(&mut self.start_date_option, patch.start_date_option);
        take(&mut self.start_date, patch.start_date);
        take(&mut self.card_name, patch.card_name);
    }

    pub fn is_empty(&self) -> bool {
        *self == FlowData::default()
    }
}

/// The persisted record for one wizard session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    /// Unknown step names read back as `None`
    #[serde(default, deserialize_with = "lenient_step")]
    pub current_step: Option<StepId>,
    #[serde(default)]
    pub data: FlowData,
    #[serde(default)]
    pub is_editing: bool,
}

fn lenient_step<'de, D>(deserializer: D) -> Result<Option<StepId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(StepId::parse))
}

impl FlowState {
    /// Apply a partial write
    pub fn apply(&mut self, patch: FlowStatePatch) {
        if let Some(step) = patch.current_step {
            self.current_step = Some(step);
        }
        if let Some(is_editing) = patch.is_editing {
            self.is_editing = is_editing;
        }
        if let Some(data) = patch.data {
            self.data.merge(data);
        }
    }
}

/// Partial write to the persisted record; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowStatePatch {
    pub current_step: Option<StepId>,
    pub is_editing: Option<bool>,
    pub data: Option<FlowData>,
}

impl FlowStatePatch {
    /// Controller-driven navigation: always leaves edit mode
    pub fn navigate(step: StepId) -> Self {
        Self {
            current_step: Some(step),
            is_editing: Some(false),
            data: None,
        }
    }

    /// Re-enter an earlier step from the confirmation screen
    pub fn edit(step: StepId) -> Self {
        Self {
            current_step: Some(step),
            is_editing: Some(true),
            data: None,
        }
    }

    pub fn data(data: FlowData) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }
}
