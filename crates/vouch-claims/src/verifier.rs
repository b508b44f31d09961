use chrono::{DateTime, Utc};
use std::sync::Arc;

use vouch_core::{Did, Schema};
use vouch_crypto::{verify_digest, Hash, PublicKey, Signature};
use vouch_ledger::{ClaimRegistry, SchemaRegistry, TrustLedger};

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::trust::RootOfTrust;

/// Caller-supplied business rule run after every protocol check passed.
pub type ClaimPredicate = dyn Fn(&Claim) -> bool + Send + Sync;

/// Result of claim verification.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Whether every check that ran passed.
    pub valid: bool,
    /// Checks in the order they ran. Stops at the first failure.
    pub checks: Vec<VerificationCheck>,
}

impl VerificationResult {
    /// The check that made the claim invalid, if any.
    pub fn failed_check(&self) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| !c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// An individual verification check.
#[derive(Debug, Clone)]
pub struct VerificationCheck {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Why it failed.
    pub detail: Option<String>,
}

/// Accumulates checks and reports whether the pipeline may continue.
struct CheckLog {
    checks: Vec<VerificationCheck>,
}

impl CheckLog {
    fn new() -> Self {
        Self { checks: Vec::new() }
    }

    fn record(&mut self, name: &str, passed: bool, detail: impl FnOnce() -> String) -> bool {
        let detail = if passed { None } else { Some(detail()) };
        if let Some(reason) = &detail {
            tracing::debug!(check = name, reason = %reason, "claim check failed");
        }
        self.checks.push(VerificationCheck {
            name: name.to_string(),
            passed,
            detail,
        });
        passed
    }

    fn finish(self) -> VerificationResult {
        VerificationResult {
            valid: self.checks.iter().all(|c| c.passed),
            checks: self.checks,
        }
    }
}

/// Relying-party side of the protocol.
///
/// Stateless apart from its collaborator handles, so one instance can serve
/// concurrent verifications.
#[derive(Clone)]
pub struct Verifier {
    schemas: Arc<dyn SchemaRegistry>,
    claims: Arc<dyn ClaimRegistry>,
    trust: Arc<dyn TrustLedger>,
}

impl Verifier {
    pub fn new(
        schemas: Arc<dyn SchemaRegistry>,
        claims: Arc<dyn ClaimRegistry>,
        trust: Arc<dyn TrustLedger>,
    ) -> Self {
        Self {
            schemas,
            claims,
            trust,
        }
    }

    /// Verifier over a single ledger handle that serves every capability.
    pub fn from_ledger<L>(ledger: Arc<L>) -> Self
    where
        L: SchemaRegistry + ClaimRegistry + TrustLedger + 'static,
    {
        Self {
            schemas: ledger.clone(),
            claims: ledger.clone(),
            trust: ledger,
        }
    }

    pub(crate) fn schema_registry(&self) -> &Arc<dyn SchemaRegistry> {
        &self.schemas
    }

    pub(crate) fn claim_registry(&self) -> &Arc<dyn ClaimRegistry> {
        &self.claims
    }

    /// Fetch a schema definition.
    pub async fn get_schema_details(&self, name: &str) -> Result<Schema, ClaimError> {
        Ok(self.schemas.get_schema_details(name).await?)
    }

    /// Check that the claim is well formed and carries exactly the schema's
    /// attributes. Returns the schema it was checked against.
    ///
    /// Local checks run before the schema is fetched. Unknown attributes are
    /// reported before missing ones.
    pub async fn validate_claim_structure(&self, claim: &Claim) -> Result<Schema, ClaimError> {
        if claim.schema.trim().is_empty() {
            return Err(ClaimError::MissingSchema);
        }
        if claim.owner_did.is_empty() {
            return Err(ClaimError::MissingOwner);
        }
        if claim.attributes.is_empty() {
            return Err(ClaimError::EmptyAttributes);
        }

        let schema = self.get_schema_details(&claim.schema).await?;

        let unknown: Vec<String> = claim
            .attributes
            .keys()
            .filter(|key| !schema.has_attribute(key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ClaimError::UnknownAttributes(unknown));
        }

        let missing: Vec<String> = schema
            .attributes
            .iter()
            .filter(|name| !claim.attributes.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ClaimError::MissingAttributes(missing));
        }

        Ok(schema)
    }

    /// Check the claim signature against a known issuer key. No I/O.
    ///
    /// A missing or malformed signature yields `false`; only a claim that
    /// cannot be hashed is an error.
    pub fn verify_offline(
        &self,
        claim: &Claim,
        issuer_key: &PublicKey,
    ) -> Result<bool, ClaimError> {
        let digest = claim.hash()?;
        Ok(signature_matches(claim, &digest, issuer_key))
    }

    /// Check the claim signature against the issuer key published on the
    /// ledger.
    pub async fn verify(&self, claim: &Claim) -> Result<bool, ClaimError> {
        let digest = claim.hash()?;
        let issuer = claim.issuer_did.as_ref().ok_or(ClaimError::MissingIssuer)?;
        let key = self.claims.get_issuer_public_key(issuer).await?;
        Ok(signature_matches(claim, &digest, &key))
    }

    /// Signature, revocation state, validity window and the optional custom
    /// rule, in that order. `Ok(false)` means the claim is not acceptable;
    /// `Err` means a check could not be carried out.
    pub async fn validate_claim(
        &self,
        claim: &Claim,
        custom: Option<&ClaimPredicate>,
    ) -> Result<bool, ClaimError> {
        Ok(self.validate_claim_report(claim, custom).await?.valid)
    }

    /// [`Verifier::validate_claim`] with the individual check outcomes.
    pub async fn validate_claim_report(
        &self,
        claim: &Claim,
        custom: Option<&ClaimPredicate>,
    ) -> Result<VerificationResult, ClaimError> {
        let mut log = CheckLog::new();
        self.run_checks(claim, None, custom, Utc::now(), &mut log)
            .await?;
        Ok(log.finish())
    }

    /// The full relying-party pipeline: structure, signature, revocation,
    /// validity window, root-of-trust membership, custom rule.
    pub async fn validate_trusted_claim(
        &self,
        claim: &Claim,
        rot_script_hash: &str,
        custom: Option<&ClaimPredicate>,
    ) -> Result<VerificationResult, ClaimError> {
        let mut log = CheckLog::new();

        let structure = match self.validate_claim_structure(claim).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_input_error() => Err(e.to_string()),
            Err(e) => return Err(e),
        };
        let structure_ok = structure.is_ok();
        if !log.record("structure_valid", structure_ok, || {
            structure.err().unwrap_or_default()
        }) {
            return Ok(log.finish());
        }

        self.run_checks(claim, Some(rot_script_hash), custom, Utc::now(), &mut log)
            .await?;
        let result = log.finish();

        tracing::info!(
            claim_id = %claim.id,
            schema = %claim.schema,
            valid = result.valid,
            "claim assessed"
        );
        Ok(result)
    }

    /// Whether the root of trust at `rot_script_hash` has an active record for
    /// `(issuer, schema_name)`.
    pub async fn is_issuer_trusted(
        &self,
        rot_script_hash: &str,
        issuer: &Did,
        schema_name: &str,
    ) -> Result<bool, ClaimError> {
        RootOfTrust::new(rot_script_hash, self.trust.clone())
            .is_trusted(issuer, schema_name)
            .await
    }

    async fn run_checks(
        &self,
        claim: &Claim,
        rot_script_hash: Option<&str>,
        custom: Option<&ClaimPredicate>,
        now: DateTime<Utc>,
        log: &mut CheckLog,
    ) -> Result<(), ClaimError> {
        let signature_ok = match &claim.issuer_did {
            Some(_) => self.verify(claim).await?,
            None => false,
        };
        if !log.record("signature_valid", signature_ok, || {
            if claim.issuer_did.is_none() {
                "claim has no issuer DID".into()
            } else {
                "signature does not match the issuer key".into()
            }
        }) {
            return Ok(());
        }

        let not_revoked = self.claims.is_valid_claim(&claim.id).await?;
        if !log.record("not_revoked", not_revoked, || {
            format!("claim {} is revoked or was never issued", claim.id)
        }) {
            return Ok(());
        }

        let in_window = claim.is_within_validity(now);
        if !log.record("within_validity", in_window, || {
            format!("claim is not valid at {}", now.to_rfc3339())
        }) {
            return Ok(());
        }

        if let Some(script_hash) = rot_script_hash {
            // issuer_did is present: the signature check above required it.
            let issuer = claim.issuer_did.clone().unwrap_or_default();
            let trusted = self
                .is_issuer_trusted(script_hash, &issuer, &claim.schema)
                .await?;
            if !log.record("issuer_trusted", trusted, || {
                format!("issuer {} is not trusted for {}", issuer, claim.schema)
            }) {
                return Ok(());
            }
        }

        if let Some(predicate) = custom {
            log.record("custom_rules", predicate(claim), || {
                "custom validator rejected the claim".into()
            });
        }

        Ok(())
    }
}

/// Compare the claim's hex signature with `digest` under `key`.
fn signature_matches(claim: &Claim, digest: &Hash, key: &PublicKey) -> bool {
    let Some(signature_hex) = claim.signature.as_deref() else {
        return false;
    };
    match Signature::from_hex(signature_hex) {
        Ok(signature) => verify_digest(digest, &signature, key).is_ok(),
        Err(e) => {
            tracing::debug!(claim_id = %claim.id, error = %e, "malformed claim signature");
            false
        }
    }
}
