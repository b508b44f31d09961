use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use vouch_core::{
    ClaimEvent, ClaimState, ClaimStateMachine, Did, Schema, TrustRecord, TxOptions, TxRef,
};
use vouch_crypto::{hash_fields, KeyPair, PublicKey};

use crate::error::LedgerError;
use crate::traits::{ClaimRegistry, SchemaRegistry, TrustLedger};

/// A write accepted by the in-memory ledger.
#[derive(Debug, Clone, Serialize)]
pub struct TxRecord {
    pub tx: TxRef,
    /// Contract operation, e.g. `inject_claim`.
    pub operation: &'static str,
    /// Claim id, schema name or trust pair the write touched.
    pub subject: String,
    pub options: TxOptions,
}

/// Ledger-side record of an issued claim.
#[derive(Debug, Clone)]
struct ClaimEntry {
    state: ClaimState,
    schema: String,
}

/// Trust records keyed by (script hash, issuer DID, schema name).
type TrustKey = (String, Did, String);

/// In-process stand-in for one issuer's contract plus any number of
/// root-of-trust registries.
///
/// Writes are authorised by comparing the presented key with the key the
/// contract (or registry) was deployed with. `set_offline` and
/// `set_rejecting_writes` inject collaborator failures for tests.
pub struct MemoryLedger {
    issuer_did: Did,
    issuer_key: PublicKey,
    schemas: DashMap<String, Schema>,
    claims: DashMap<String, ClaimEntry>,
    /// Issuer DID → current public key, used by verifiers.
    issuer_keys: DashMap<Did, PublicKey>,
    /// Script hash → registry owner key.
    trust_registries: DashMap<String, PublicKey>,
    trust_records: DashMap<TrustKey, TrustRecord>,
    transactions: DashMap<TxRef, TxRecord>,
    sequence: AtomicU64,
    submissions: AtomicU64,
    offline: AtomicBool,
    rejecting_writes: AtomicBool,
}

impl MemoryLedger {
    /// Deploy a contract owned by `issuer_did`, authorised by `issuer_key`.
    pub fn new(issuer_did: Did, issuer_key: PublicKey) -> Self {
        let issuer_keys = DashMap::new();
        issuer_keys.insert(issuer_did.clone(), issuer_key.clone());
        Self {
            issuer_did,
            issuer_key,
            schemas: DashMap::new(),
            claims: DashMap::new(),
            issuer_keys,
            trust_registries: DashMap::new(),
            trust_records: DashMap::new(),
            transactions: DashMap::new(),
            sequence: AtomicU64::new(0),
            submissions: AtomicU64::new(0),
            offline: AtomicBool::new(false),
            rejecting_writes: AtomicBool::new(false),
        }
    }

    /// Publish (or rotate) the public key of another issuer.
    pub fn register_issuer_key(&self, issuer: Did, key: PublicKey) {
        tracing::debug!(issuer = %issuer, "issuer key published");
        self.issuer_keys.insert(issuer, key);
    }

    /// Deploy a root-of-trust registry at `script_hash`, owned by `owner`.
    pub fn deploy_trust_registry(&self, script_hash: impl Into<String>, owner: PublicKey) {
        let script_hash = script_hash.into();
        tracing::info!(script_hash = %script_hash, "trust registry deployed");
        self.trust_registries.insert(script_hash, owner);
    }

    /// Make every call fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make writes fail with a contract error while reads keep working.
    pub fn set_rejecting_writes(&self, rejecting: bool) {
        self.rejecting_writes.store(rejecting, Ordering::SeqCst);
    }

    /// Number of write submissions attempted, accepted or not.
    pub fn submission_count(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Current ledger state of a claim id.
    pub fn claim_state(&self, claim_id: &str) -> Option<ClaimState> {
        self.claims.get(claim_id).map(|entry| entry.state)
    }

    /// Look up an accepted transaction.
    pub fn transaction(&self, tx: &TxRef) -> Option<TxRecord> {
        self.transactions.get(tx).map(|r| r.clone())
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    fn ensure_online(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Network("ledger endpoint unreachable".into()));
        }
        Ok(())
    }

    /// Common prologue for every write: count it, then fail if injected.
    fn begin_write(&self, operation: &str) -> Result<(), LedgerError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        if self.rejecting_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Contract(format!(
                "{} transaction rejected",
                operation
            )));
        }
        Ok(())
    }

    fn authorize_issuer(&self, key: &KeyPair) -> Result<(), LedgerError> {
        if key.public_key() != self.issuer_key {
            return Err(LedgerError::Unauthorized(format!(
                "key is not the contract key of {}",
                self.issuer_did
            )));
        }
        Ok(())
    }

    fn authorize_trust_owner(&self, script_hash: &str, key: &KeyPair) -> Result<(), LedgerError> {
        let owner = self
            .trust_registries
            .get(script_hash)
            .ok_or_else(|| LedgerError::TrustRegistryNotFound(script_hash.to_string()))?;
        if key.public_key() != *owner {
            return Err(LedgerError::Unauthorized(format!(
                "key does not own trust registry {}",
                script_hash
            )));
        }
        Ok(())
    }

    fn ensure_trust_registry(&self, script_hash: &str) -> Result<(), LedgerError> {
        if !self.trust_registries.contains_key(script_hash) {
            return Err(LedgerError::TrustRegistryNotFound(script_hash.to_string()));
        }
        Ok(())
    }

    /// Assign a transaction reference and keep the record.
    fn commit(&self, operation: &'static str, subject: &str, options: &TxOptions) -> TxRef {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let digest = hash_fields(&[
            operation.as_bytes(),
            subject.as_bytes(),
            &seq.to_le_bytes(),
        ]);
        let tx = TxRef::new(hex::encode(digest));
        self.transactions.insert(
            tx.clone(),
            TxRecord {
                tx: tx.clone(),
                operation,
                subject: subject.to_string(),
                options: options.clone(),
            },
        );
        tracing::info!(
            operation,
            subject,
            tx = %tx,
            gas = ?options.gas,
            extra_outputs = options.extra_outputs.len(),
            "ledger transaction committed"
        );
        tx
    }

    fn set_trust(&self, script_hash: &str, issuer: &Did, schema_name: &str, active: bool) {
        let key = (script_hash.to_string(), issuer.clone(), schema_name.to_string());
        self.trust_records
            .entry(key)
            .and_modify(|record| record.active = active)
            .or_insert_with(|| TrustRecord {
                issuer_did: issuer.clone(),
                schema_name: schema_name.to_string(),
                active,
            });
    }
}

#[async_trait]
impl SchemaRegistry for MemoryLedger {
    async fn get_schema_details(&self, name: &str) -> Result<Schema, LedgerError> {
        self.ensure_online()?;
        self.schemas
            .get(name)
            .map(|s| s.clone())
            .ok_or_else(|| LedgerError::SchemaNotFound(name.to_string()))
    }

    async fn register_schema(
        &self,
        schema: &Schema,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError> {
        self.begin_write("register_schema")?;
        self.authorize_issuer(key)?;

        if schema.attributes.is_empty() || schema.attributes.iter().any(|a| a.trim().is_empty())
        {
            return Err(LedgerError::InvalidAttributes(
                "attribute names must be non-empty".into(),
            ));
        }
        if let Some(dup) = schema.duplicate_attribute() {
            return Err(LedgerError::InvalidAttributes(format!(
                "duplicate attribute: {}",
                dup
            )));
        }

        match self.schemas.entry(schema.name.clone()) {
            Entry::Occupied(_) => Err(LedgerError::SchemaAlreadyExists(schema.name.clone())),
            Entry::Vacant(slot) => {
                let tx = self.commit("register_schema", &schema.name, options);
                slot.insert(schema.clone().with_tx(tx.clone()));
                Ok(tx)
            }
        }
    }

    async fn get_issuer_did(&self) -> Result<Did, LedgerError> {
        self.ensure_online()?;
        Ok(self.issuer_did.clone())
    }
}

#[async_trait]
impl ClaimRegistry for MemoryLedger {
    async fn get_issuer_public_key(&self, issuer: &Did) -> Result<PublicKey, LedgerError> {
        self.ensure_online()?;
        self.issuer_keys
            .get(issuer)
            .map(|k| k.clone())
            .ok_or_else(|| LedgerError::IssuerNotFound(issuer.clone()))
    }

    async fn is_valid_claim(&self, claim_id: &str) -> Result<bool, LedgerError> {
        self.ensure_online()?;
        Ok(self
            .claims
            .get(claim_id)
            .map(|entry| entry.state.is_valid())
            .unwrap_or(false))
    }

    async fn inject_claim(
        &self,
        claim_id: &str,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError> {
        self.begin_write("inject_claim")?;
        self.authorize_issuer(key)?;

        match self.claims.entry(claim_id.to_string()) {
            Entry::Occupied(_) => Err(LedgerError::ClaimAlreadyRecorded(claim_id.to_string())),
            Entry::Vacant(slot) => {
                let state = ClaimStateMachine::transition(None, ClaimEvent::Issue)?;
                let tx = self.commit("inject_claim", claim_id, options);
                slot.insert(ClaimEntry {
                    state,
                    schema: schema_name.to_string(),
                });
                Ok(tx)
            }
        }
    }

    async fn revoke_claim(
        &self,
        claim_id: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError> {
        self.begin_write("revoke_claim")?;
        self.authorize_issuer(key)?;

        let mut entry = self
            .claims
            .get_mut(claim_id)
            .ok_or_else(|| LedgerError::ClaimNotRecorded(claim_id.to_string()))?;
        // Claims of a schema this contract never registered carry no rule.
        if let Some(schema) = self.schemas.get(&entry.schema) {
            if !schema.revocable {
                return Err(LedgerError::NotRevocable(claim_id.to_string()));
            }
        }
        let next = ClaimStateMachine::transition(Some(entry.state), ClaimEvent::Revoke)?;
        let tx = self.commit("revoke_claim", claim_id, options);
        entry.state = next;
        Ok(tx)
    }
}

#[async_trait]
impl TrustLedger for MemoryLedger {
    async fn is_trusted(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .trust_record(script_hash, issuer, schema_name)
            .await?
            .map(|record| record.active)
            .unwrap_or(false))
    }

    async fn trust_record(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
    ) -> Result<Option<TrustRecord>, LedgerError> {
        self.ensure_online()?;
        self.ensure_trust_registry(script_hash)?;
        let key = (script_hash.to_string(), issuer.clone(), schema_name.to_string());
        Ok(self.trust_records.get(&key).map(|r| r.clone()))
    }

    async fn register_issuer(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError> {
        self.begin_write("register_issuer")?;
        self.authorize_trust_owner(script_hash, key)?;
        let subject = format!("{}/{}/{}", script_hash, issuer, schema_name);
        let tx = self.commit("register_issuer", &subject, options);
        self.set_trust(script_hash, issuer, schema_name, true);
        Ok(tx)
    }

    async fn deactivate_issuer(
        &self,
        script_hash: &str,
        issuer: &Did,
        schema_name: &str,
        key: &KeyPair,
        options: &TxOptions,
    ) -> Result<TxRef, LedgerError> {
        self.begin_write("deactivate_issuer")?;
        self.authorize_trust_owner(script_hash, key)?;
        let subject = format!("{}/{}/{}", script_hash, issuer, schema_name);
        let tx = self.commit("deactivate_issuer", &subject, options);
        self.set_trust(script_hash, issuer, schema_name, false);
        Ok(tx)
    }
}
