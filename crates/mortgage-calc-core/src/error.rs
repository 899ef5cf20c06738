use thiserror::Error;

use crate::types::ScenarioId;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Scenario {0} not found")]
    ScenarioNotFound(ScenarioId),

    #[error("Duplicate scenario id {0} in record set")]
    DuplicateScenario(ScenarioId),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MortgageError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        MortgageError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by numeric preconditions on the inputs.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, MortgageError::InvalidInput { .. })
    }

    /// True when a referenced scenario id is not registered.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MortgageError::ScenarioNotFound(_))
    }
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}
