use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vouch_core::{Did, TxRef};
use vouch_crypto::Hash;

use crate::error::ClaimError;

/// Attribute name → value. Ordered, so iteration (and therefore the
/// canonical form) never depends on insertion order.
pub type ClaimAttributes = BTreeMap<String, serde_json::Value>;

/// An attestation of attribute values about a subject, bound to a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Caller-supplied id, unique within the issuer's contract.
    pub id: String,
    /// Name of the schema this claim conforms to.
    pub schema: String,
    #[serde(rename = "ownerDID")]
    pub owner_did: Did,
    /// Set by issuance only.
    #[serde(rename = "issuerDID", default, skip_serializing_if = "Option::is_none")]
    pub issuer_did: Option<Did>,
    pub attributes: ClaimAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    /// Hex Ed25519 signature over [`Claim::hash`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Ledger transaction of the last issuance or revocation. Audit only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<TxRef>,
}

impl Claim {
    /// Build an unsigned, unissued claim. No validation happens here.
    pub fn new(
        id: impl Into<String>,
        schema: impl Into<String>,
        attributes: ClaimAttributes,
        owner_did: impl Into<Did>,
    ) -> Self {
        Self {
            id: id.into(),
            schema: schema.into(),
            owner_did: owner_did.into(),
            issuer_did: None,
            attributes,
            valid_from: None,
            valid_to: None,
            signature: None,
            tx: None,
        }
    }

    /// Bound the validity window. `None` leaves that side open.
    pub fn with_validity(
        mut self,
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Self {
        self.valid_from = valid_from;
        self.valid_to = valid_to;
        self
    }

    pub fn with_issuer(mut self, issuer_did: Did) -> Self {
        self.issuer_did = Some(issuer_did);
        self
    }

    pub fn with_signature(mut self, signature_hex: String) -> Self {
        self.signature = Some(signature_hex);
        self
    }

    pub fn with_tx(mut self, tx: TxRef) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Deterministic bytes of everything a signature covers.
    ///
    /// Excludes `signature` and `tx`. Attribute order follows the sorted
    /// attribute map, so two claims with the same content always produce the
    /// same bytes.
    pub fn canonicalize(&self) -> Result<Vec<u8>, ClaimError> {
        if self.id.trim().is_empty() {
            return Err(ClaimError::MissingClaimId);
        }
        if self.schema.trim().is_empty() {
            return Err(ClaimError::MissingSchema);
        }
        if self.owner_did.is_empty() {
            return Err(ClaimError::MissingOwner);
        }

        let canonical = serde_json::json!({
            "id": self.id,
            "schema": self.schema,
            "ownerDID": self.owner_did,
            "issuerDID": self.issuer_did,
            "attributes": self.attributes,
            "validFrom": self.valid_from.map(|d| d.to_rfc3339()),
            "validTo": self.valid_to.map(|d| d.to_rfc3339()),
        });
        // A json! value built from strings and JSON values always serializes.
        Ok(serde_json::to_vec(&canonical).unwrap_or_default())
    }

    /// BLAKE3 digest of the canonical bytes.
    pub fn hash(&self) -> Result<Hash, ClaimError> {
        Ok(vouch_crypto::hash(&self.canonicalize()?))
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// `valid_from <= now <= valid_to`, with absent bounds open.
    pub fn is_within_validity(&self, now: DateTime<Utc>) -> bool {
        let started = self.valid_from.map(|from| from <= now).unwrap_or(true);
        let not_ended = self.valid_to.map(|to| now <= to).unwrap_or(true);
        started && not_ended
    }
}
