//! Shared fixtures for the cross-crate tests.

use std::sync::Arc;

use vouch_claims::{Claim, ClaimAttributes, ClaimError, Issuer};
use vouch_core::{Did, LoggingConfig, TxOptions};
use vouch_crypto::KeyPair;
use vouch_ledger::MemoryLedger;

pub const ISSUER_DID: &str = "did:example:kyc-issuer";
pub const KYC_SCHEMA: &str = "KYC";

/// Attribute names of the KYC schema, in registration order.
pub fn kyc_schema_attributes() -> Vec<String> {
    vec!["firstName".into(), "lastName".into(), "age".into()]
}

/// An issuer contract deployed on a fresh in-memory ledger.
pub struct IssuerFixture {
    pub ledger: Arc<MemoryLedger>,
    pub issuer: Issuer,
    pub key: KeyPair,
}

impl IssuerFixture {
    /// Deploy a contract for [`ISSUER_DID`] keyed from `seed`.
    pub fn new(seed: u8) -> Self {
        let key = KeyPair::from_seed(&[seed; 32]);
        let ledger = Arc::new(MemoryLedger::new(Did::from(ISSUER_DID), key.public_key()));
        let issuer = Issuer::from_ledger(ledger.clone());
        Self {
            ledger,
            issuer,
            key,
        }
    }

    /// Deploy and register the revocable KYC schema.
    pub async fn with_kyc_schema(seed: u8) -> Result<Self, ClaimError> {
        let fixture = Self::new(seed);
        fixture
            .issuer
            .register_new_schema(
                KYC_SCHEMA,
                kyc_schema_attributes(),
                true,
                &fixture.key,
                &TxOptions::new(),
            )
            .await?;
        Ok(fixture)
    }

    /// Unsigned KYC claim about `owner`.
    pub fn kyc_claim(&self, id: &str, owner: &str) -> Claim {
        self.issuer.create_claim(
            id,
            KYC_SCHEMA,
            kyc_attributes("John", "Doe", 26),
            owner,
            None,
            None,
        )
    }
}

pub fn kyc_attributes(first_name: &str, last_name: &str, age: u32) -> ClaimAttributes {
    let mut attributes = ClaimAttributes::new();
    attributes.insert("firstName".into(), serde_json::json!(first_name));
    attributes.insert("lastName".into(), serde_json::json!(last_name));
    attributes.insert("age".into(), serde_json::json!(age));
    attributes
}

/// `did:key` identifier of a holder whose key is derived from `seed`.
pub fn holder_did(seed: u8) -> Did {
    let holder = KeyPair::from_seed(&[seed; 32]);
    Did::from_key_bs58(&holder.public_key().to_bs58())
}

/// Route test logs through the workspace subscriber. Safe to call repeatedly.
pub fn init_logging() {
    let _ = vouch_core::logging::init(&LoggingConfig {
        level: "debug".into(),
        format: "text".into(),
    });
}
