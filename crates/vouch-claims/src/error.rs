use vouch_core::Did;
use vouch_ledger::LedgerError;

use crate::claim::Claim;

/// Claim protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("claim has no id")]
    MissingClaimId,

    #[error("claim has no schema")]
    MissingSchema,

    #[error("claim has no owner DID")]
    MissingOwner,

    #[error("claim has no attributes")]
    EmptyAttributes,

    #[error("attributes not in schema: {}", .0.join(", "))]
    UnknownAttributes(Vec<String>),

    #[error("attributes missing from claim: {}", .0.join(", "))]
    MissingAttributes(Vec<String>),

    #[error("schema name must not be empty")]
    MissingSchemaName,

    #[error("schema must have at least one attribute")]
    EmptySchemaAttributes,

    #[error("duplicate schema attribute: {0}")]
    DuplicateSchemaAttribute(String),

    #[error("claim has no issuer DID")]
    MissingIssuer,

    #[error("claim is not signed")]
    Unsigned,

    #[error("claim signature does not match the issuer key")]
    InvalidSignature,

    #[error("claim names issuer {claimed}, contract belongs to {contract}")]
    IssuerMismatch { claimed: Did, contract: Did },

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("issuer not found: {0}")]
    IssuerNotFound(Did),

    #[error("claim {0} belongs to a non-revocable schema")]
    NotRevocable(String),

    #[error("ledger error: {0}")]
    Ledger(#[source] LedgerError),

    /// The claim was signed but recording it on the ledger failed; a
    /// transaction may or may not be in flight.
    #[error("claim {} signed but not recorded: {source}", .claim.id)]
    Unrecorded {
        claim: Box<Claim>,
        #[source]
        source: LedgerError,
    },
}

impl ClaimError {
    /// Caller mistakes detected before any remote call.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingClaimId
                | Self::MissingSchema
                | Self::MissingOwner
                | Self::EmptyAttributes
                | Self::UnknownAttributes(_)
                | Self::MissingAttributes(_)
                | Self::MissingSchemaName
                | Self::EmptySchemaAttributes
                | Self::DuplicateSchemaAttribute(_)
                | Self::MissingIssuer
                | Self::Unsigned
                | Self::InvalidSignature
                | Self::IssuerMismatch { .. }
        )
    }

    /// The signed claim held by a partial issuance failure.
    pub fn unrecorded_claim(&self) -> Option<&Claim> {
        match self {
            Self::Unrecorded { claim, .. } => Some(claim),
            _ => None,
        }
    }
}

impl From<LedgerError> for ClaimError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::SchemaNotFound(name) => Self::SchemaNotFound(name),
            LedgerError::IssuerNotFound(did) => Self::IssuerNotFound(did),
            LedgerError::NotRevocable(id) => Self::NotRevocable(id),
            other => Self::Ledger(other),
        }
    }
}
