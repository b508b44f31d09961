use std::sync::Arc;

use vouch_core::{Did, TrustRecord, TxOptions, TxRef};
use vouch_crypto::KeyPair;
use vouch_ledger::TrustLedger;

use crate::error::ClaimError;

/// Handle to one root-of-trust registry, addressed by its script hash.
///
/// Records `(issuer, schema) -> active`. Records are never deleted, only
/// deactivated; a pair with no record is not trusted.
#[derive(Clone)]
pub struct RootOfTrust {
    script_hash: String,
    ledger: Arc<dyn TrustLedger>,
}

impl RootOfTrust {
    pub fn new(script_hash: impl Into<String>, ledger: Arc<dyn TrustLedger>) -> Self {
        Self {
            script_hash: script_hash.into(),
            ledger,
        }
    }

    pub fn script_hash(&self) -> &str {
        &self.script_hash
    }

    /// Trust `issuer` for `schema_name`. `key` must be the registry owner's.
    pub async fn register_issuer(
        &self,
        issuer: &Did,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, ClaimError> {
        let tx = self
            .ledger
            .register_issuer(&self.script_hash, issuer, schema_name, key, options)
            .await?;
        tracing::info!(
            registry = %self.script_hash,
            issuer = %issuer,
            schema = schema_name,
            tx = %tx,
            "issuer trusted"
        );
        Ok(tx)
    }

    /// Stop trusting `issuer` for `schema_name`. The record stays, inactive.
    pub async fn deactivate_issuer(
        &self,
        issuer: &Did,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, ClaimError> {
        let tx = self
            .ledger
            .deactivate_issuer(&self.script_hash, issuer, schema_name, key, options)
            .await?;
        tracing::info!(
            registry = %self.script_hash,
            issuer = %issuer,
            schema = schema_name,
            tx = %tx,
            "issuer deactivated"
        );
        Ok(tx)
    }

    pub async fn is_trusted(&self, issuer: &Did, schema_name: &str) -> Result<bool, ClaimError> {
        Ok(self
            .ledger
            .is_trusted(&self.script_hash, issuer, schema_name)
            .await?)
    }

    pub async fn trust_record(
        &self,
        issuer: &Did,
        schema_name: &str,
    ) -> Result<Option<TrustRecord>, ClaimError> {
        Ok(self
            .ledger
            .trust_record(&self.script_hash, issuer, schema_name)
            .await?)
    }
}
