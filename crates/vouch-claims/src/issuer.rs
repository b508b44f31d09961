use chrono::{DateTime, Utc};
use std::sync::Arc;

use vouch_core::{Did, Schema, TxOptions, TxRef};
use vouch_crypto::{sign_digest, KeyPair};
use vouch_ledger::{ClaimRegistry, LedgerError, SchemaRegistry, TrustLedger};

use crate::claim::{Claim, ClaimAttributes};
use crate::error::ClaimError;
use crate::verifier::Verifier;

/// Issues, records and revokes claims against one issuer contract.
///
/// Wraps a [`Verifier`] so the issuer checks claims exactly the way relying
/// parties will.
#[derive(Clone)]
pub struct Issuer {
    verifier: Verifier,
}

impl Issuer {
    pub fn new(
        schemas: Arc<dyn SchemaRegistry>,
        claims: Arc<dyn ClaimRegistry>,
        trust: Arc<dyn TrustLedger>,
    ) -> Self {
        Self {
            verifier: Verifier::new(schemas, claims, trust),
        }
    }

    pub fn from_ledger<L>(ledger: Arc<L>) -> Self
    where
        L: SchemaRegistry + ClaimRegistry + TrustLedger + 'static,
    {
        Self {
            verifier: Verifier::from_ledger(ledger),
        }
    }

    /// The verifier this issuer validates with.
    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// Build an unsigned claim. Nothing is validated or sent.
    pub fn create_claim(
        &self,
        id: impl Into<String>,
        schema_name: impl Into<String>,
        attributes: ClaimAttributes,
        owner_did: impl Into<Did>,
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Claim {
        Claim::new(id, schema_name, attributes, owner_did).with_validity(valid_from, valid_to)
    }

    pub async fn validate_claim_structure(&self, claim: &Claim) -> Result<Schema, ClaimError> {
        self.verifier.validate_claim_structure(claim).await
    }

    /// Return a copy of `claim` signed with `key`. `issuer_did` and `tx` are
    /// left as they are.
    pub fn sign_claim(&self, claim: &Claim, key: &KeyPair) -> Result<Claim, ClaimError> {
        let digest = claim.hash()?;
        let signature = sign_digest(&digest, key);
        Ok(claim.clone().with_signature(signature.to_hex()))
    }

    /// Validate, stamp the contract's issuer DID, sign and record `claim`.
    ///
    /// A structural failure happens before any ledger call. If recording
    /// fails after signing, the error is [`ClaimError::Unrecorded`] and holds
    /// the signed claim, which can be passed to [`Issuer::submit_claim`].
    pub async fn issue_claim(
        &self,
        claim: &Claim,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<Claim, ClaimError> {
        if claim.id.trim().is_empty() {
            return Err(ClaimError::MissingClaimId);
        }
        self.validate_claim_structure(claim).await?;

        let issuer_did = self.verifier.schema_registry().get_issuer_did().await?;
        let signed = self.sign_claim(&claim.clone().with_issuer(issuer_did), key)?;

        match self.record(&signed, key, options).await {
            Ok(tx) => {
                tracing::info!(
                    claim_id = %signed.id,
                    schema = %signed.schema,
                    owner = %signed.owner_did,
                    tx = %tx,
                    "claim issued"
                );
                Ok(signed.with_tx(tx))
            }
            Err(source) => {
                tracing::warn!(
                    claim_id = %signed.id,
                    error = %source,
                    "claim signed but not recorded"
                );
                Err(ClaimError::Unrecorded {
                    claim: Box::new(signed),
                    source,
                })
            }
        }
    }

    /// Record an already signed claim, e.g. one recovered from
    /// [`ClaimError::Unrecorded`].
    ///
    /// The claim must pass structural validation, name this contract's issuer
    /// and carry a signature that verifies under the issuer key. Nothing is
    /// written otherwise.
    pub async fn submit_claim(
        &self,
        claim: &Claim,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<Claim, ClaimError> {
        if claim.id.trim().is_empty() {
            return Err(ClaimError::MissingClaimId);
        }
        if !claim.is_signed() {
            return Err(ClaimError::Unsigned);
        }
        let claimed = claim.issuer_did.as_ref().ok_or(ClaimError::MissingIssuer)?;

        self.validate_claim_structure(claim).await?;

        let contract = self.verifier.schema_registry().get_issuer_did().await?;
        if *claimed != contract {
            return Err(ClaimError::IssuerMismatch {
                claimed: claimed.clone(),
                contract,
            });
        }
        let issuer_key = self
            .verifier
            .claim_registry()
            .get_issuer_public_key(&contract)
            .await?;
        if !self.verifier.verify_offline(claim, &issuer_key)? {
            return Err(ClaimError::InvalidSignature);
        }

        let tx = self.record(claim, key, options).await?;
        tracing::info!(claim_id = %claim.id, tx = %tx, "claim submitted");
        Ok(claim.clone().with_tx(tx))
    }

    /// Revoke the claim with `claim_id`.
    ///
    /// Returns `None` without writing when the ledger does not hold it as
    /// valid, which covers both never-issued and already-revoked ids.
    pub async fn revoke_claim_by_id(
        &self,
        claim_id: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<Option<TxRef>, ClaimError> {
        if claim_id.trim().is_empty() {
            return Err(ClaimError::MissingClaimId);
        }

        let registry = self.verifier.claim_registry();
        if !registry.is_valid_claim(claim_id).await? {
            tracing::debug!(claim_id, "claim not currently valid, nothing to revoke");
            return Ok(None);
        }

        let tx = registry.revoke_claim(claim_id, key, options).await?;
        tracing::info!(claim_id, tx = %tx, "claim revoked");
        Ok(Some(tx))
    }

    pub async fn revoke_claim(
        &self,
        claim: &Claim,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<Option<TxRef>, ClaimError> {
        self.revoke_claim_by_id(&claim.id, key, options).await
    }

    /// Register a schema on the issuer contract and return it with its
    /// transaction reference attached.
    pub async fn register_new_schema(
        &self,
        name: &str,
        attributes: Vec<String>,
        revocable: bool,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<Schema, ClaimError> {
        if name.trim().is_empty() {
            return Err(ClaimError::MissingSchemaName);
        }
        if attributes.is_empty() {
            return Err(ClaimError::EmptySchemaAttributes);
        }
        let schema = Schema::new(name, attributes, revocable);
        if let Some(duplicate) = schema.duplicate_attribute() {
            return Err(ClaimError::DuplicateSchemaAttribute(duplicate.to_string()));
        }

        let tx = self
            .verifier
            .schema_registry()
            .register_schema(&schema, key, options)
            .await?;
        tracing::info!(
            schema = name,
            attributes = schema.attributes.len(),
            revocable,
            tx = %tx,
            "schema registered"
        );
        Ok(schema.with_tx(tx))
    }

    async fn record(
        &self,
        claim: &Claim,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError> {
        self.verifier
            .claim_registry()
            .inject_claim(&claim.id, &claim.schema, key, options)
            .await
    }
}
