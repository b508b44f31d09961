use vouch_core::{CoreError, Did};

/// Failures reported by the ledger collaborator.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("schema already exists: {0}")]
    SchemaAlreadyExists(String),

    #[error("invalid schema attributes: {0}")]
    InvalidAttributes(String),

    #[error("issuer not found: {0}")]
    IssuerNotFound(Did),

    #[error("claim already recorded: {0}")]
    ClaimAlreadyRecorded(String),

    #[error("claim not recorded: {0}")]
    ClaimNotRecorded(String),

    #[error("claim {0} belongs to a non-revocable schema")]
    NotRevocable(String),

    #[error("trust registry not found: {0}")]
    TrustRegistryNotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("state error: {0}")]
    State(#[from] CoreError),
}

impl LedgerError {
    /// Lookup failures that depend on remote state rather than transport.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound(_)
                | Self::IssuerNotFound(_)
                | Self::ClaimNotRecorded(_)
                | Self::TrustRegistryNotFound(_)
        )
    }
}
