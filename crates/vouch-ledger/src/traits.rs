use async_trait::async_trait;
use vouch_core::{Did, Schema, TrustRecord, TxOptions, TxRef};
use vouch_crypto::{KeyPair, PublicKey};

use crate::error::LedgerError;

/// Schema side of an issuer's contract.
///
/// Every call is a remote round trip from the caller's point of view. The
/// implementation owns retry policy; callers see the first failure.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Read a registered schema by name.
    async fn get_schema_details(&self, name: &str) -> Result<Schema, LedgerError>;

    /// Register a new schema, authorised by the issuer's key.
    async fn register_schema(
        &self,
        schema: &Schema,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError>;

    /// DID of the issuer that owns this contract.
    async fn get_issuer_did(&self) -> Result<Did, LedgerError>;
}

/// Claim issuance and revocation markers.
#[async_trait]
pub trait ClaimRegistry: Send + Sync {
    /// Current public key registered for `issuer`.
    async fn get_issuer_public_key(&self, issuer: &Did) -> Result<PublicKey, LedgerError>;

    /// True while the claim is recorded and not revoked.
    async fn is_valid_claim(&self, claim_id: &str) -> Result<bool, LedgerError>;

    /// Record that `claim_id`, conforming to `schema_name`, has been issued.
    async fn inject_claim(
        &self,
        claim_id: &str,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError>;

    /// Record that `claim_id` has been revoked. Fails with
    /// [`LedgerError::NotRevocable`] when its schema is not revocable.
    async fn revoke_claim(
        &self,
        claim_id: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError>;
}

/// Root-of-trust registries, addressed by script hash.
#[async_trait]
pub trait TrustLedger: Send + Sync {
    /// Whether an active record exists for `(issuer, schema_name)`.
    async fn is_trusted(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
    ) -> Result<bool, LedgerError>;

    /// Raw record for `(issuer, schema_name)`, if one was ever written.
    async fn trust_record(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
    ) -> Result<Option<TrustRecord>, LedgerError>;

    /// Create or re-activate the record for `(issuer, schema_name)`.
    async fn register_issuer(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError>;

    /// Mark the record for `(issuer, schema_name)` inactive.
    async fn deactivate_issuer(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError>;
}
