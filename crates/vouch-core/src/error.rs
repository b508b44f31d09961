use crate::claim_state::ClaimState;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid claim state transition from {from} to {to}")]
    InvalidStateTransition { from: ClaimState, to: ClaimState },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid log format: {0} (expected \"text\" or \"json\")")]
    InvalidLogFormat(String),
}
