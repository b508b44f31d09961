//! Integration test: claim lifecycle across crates.
//!
//! Issuer registers a schema, issues, and revokes; a relying party validates
//! the claim it was handed, all against one in-memory ledger.

use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::future::join_all;
use vouch_claims::{Claim, ClaimError, Verifier};
use vouch_core::{ClaimState, Did, LedgerConfig, TxOptions, VouchConfig};
use vouch_crypto::KeyPair;
use vouch_integration_tests::{
    holder_did, init_logging, kyc_attributes, IssuerFixture, ISSUER_DID, KYC_SCHEMA,
};
use vouch_ledger::LedgerError;

// =========================================================================
// KYC scenario: issue → validate → revoke → validate
// =========================================================================

#[tokio::test]
async fn test_kyc_end_to_end() {
    init_logging();
    let f = IssuerFixture::with_kyc_schema(1)
        .await
        .expect("schema registration should succeed");

    let claim = f.kyc_claim("kyc-001", "did:example:alice");
    let issued = f
        .issuer
        .issue_claim(&claim, &f.key, &TxOptions::new())
        .await
        .expect("issuance should succeed");

    assert_eq!(issued.issuer_did, Some(Did::from(ISSUER_DID)));
    assert!(issued.tx.is_some());

    // Relying party builds its own verifier over the same ledger
    let verifier = Verifier::from_ledger(f.ledger.clone());
    assert!(verifier.validate_claim(&issued, None).await.unwrap());

    let tx = f
        .issuer
        .revoke_claim(&issued, &f.key, &TxOptions::new())
        .await
        .unwrap();
    assert!(tx.is_some());
    assert_eq!(f.ledger.claim_state("kyc-001"), Some(ClaimState::Revoked));

    let report = verifier.validate_claim_report(&issued, None).await.unwrap();
    assert!(!report.valid);
    assert_eq!(report.failed_check().unwrap().name, "not_revoked");

    // Revocation does not touch the signature itself
    assert!(verifier
        .verify_offline(&issued, &f.key.public_key())
        .unwrap());
}

#[tokio::test]
async fn test_partial_attributes_rejected_before_any_write() {
    let f = IssuerFixture::with_kyc_schema(2).await.unwrap();
    let mut attributes = kyc_attributes("John", "Doe", 26);
    attributes.remove("lastName");
    attributes.remove("age");
    let claim = f
        .issuer
        .create_claim("kyc-002", KYC_SCHEMA, attributes, "did:example:bob", None, None);

    let before = f.ledger.submission_count();
    let err = f
        .issuer
        .issue_claim(&claim, &f.key, &TxOptions::new())
        .await
        .unwrap_err();

    match err {
        ClaimError::MissingAttributes(missing) => assert_eq!(missing, vec!["lastName", "age"]),
        other => panic!("expected MissingAttributes, got {:?}", other),
    }
    assert_eq!(f.ledger.submission_count(), before);
    assert!(f.ledger.claim_state("kyc-002").is_none());
}

#[tokio::test]
async fn test_revoke_twice_and_unknown_are_noops() {
    let f = IssuerFixture::with_kyc_schema(3).await.unwrap();
    let issued = f
        .issuer
        .issue_claim(&f.kyc_claim("kyc-003", "did:example:carol"), &f.key, &TxOptions::new())
        .await
        .unwrap();

    let first = f
        .issuer
        .revoke_claim(&issued, &f.key, &TxOptions::new())
        .await
        .unwrap();
    let second = f
        .issuer
        .revoke_claim(&issued, &f.key, &TxOptions::new())
        .await
        .unwrap();
    let unknown = f
        .issuer
        .revoke_claim_by_id("never-issued", &f.key, &TxOptions::new())
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
    assert!(unknown.is_none());
    assert_eq!(f.ledger.claim_state("kyc-003"), Some(ClaimState::Revoked));
}

// =========================================================================
// Relying-party handoff
// =========================================================================

#[tokio::test]
async fn test_claim_survives_json_handoff() {
    let f = IssuerFixture::with_kyc_schema(4).await.unwrap();
    let issued = f
        .issuer
        .issue_claim(&f.kyc_claim("kyc-004", "did:example:dave"), &f.key, &TxOptions::new())
        .await
        .unwrap();

    let wire = serde_json::to_string(&issued).unwrap();
    let received: Claim = serde_json::from_str(&wire).unwrap();
    assert_eq!(received, issued);

    let verifier = Verifier::from_ledger(f.ledger.clone());
    assert!(verifier.verify(&received).await.unwrap());
    assert!(verifier.validate_claim(&received, None).await.unwrap());
}

#[tokio::test]
async fn test_tampered_claim_fails_validation() {
    let f = IssuerFixture::with_kyc_schema(5).await.unwrap();
    let issued = f
        .issuer
        .issue_claim(&f.kyc_claim("kyc-005", "did:example:erin"), &f.key, &TxOptions::new())
        .await
        .unwrap();

    let mut tampered = issued.clone();
    tampered
        .attributes
        .insert("age".into(), serde_json::json!(17));

    let verifier = f.issuer.verifier();
    assert!(!verifier.verify(&tampered).await.unwrap());
    let report = verifier.validate_claim_report(&tampered, None).await.unwrap();
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.failed_check().unwrap().name, "signature_valid");
}

#[tokio::test]
async fn test_claim_signed_by_other_key_fails() {
    let f = IssuerFixture::with_kyc_schema(6).await.unwrap();
    let forger = KeyPair::generate();
    let forged = f
        .issuer
        .sign_claim(
            &f.kyc_claim("kyc-006", "did:example:frank")
                .with_issuer(Did::from(ISSUER_DID)),
            &forger,
        )
        .unwrap();

    assert!(!f.issuer.verifier().verify(&forged).await.unwrap());
}

#[tokio::test]
async fn test_not_yet_valid_claim() {
    let f = IssuerFixture::with_kyc_schema(7).await.unwrap();
    let claim = f.issuer.create_claim(
        "kyc-007",
        KYC_SCHEMA,
        kyc_attributes("Grace", "Hopper", 40),
        "did:example:grace",
        Some(Utc::now() + Duration::days(1)),
        None,
    );
    let issued = f
        .issuer
        .issue_claim(&claim, &f.key, &TxOptions::new())
        .await
        .unwrap();

    let report = f
        .issuer
        .verifier()
        .validate_claim_report(&issued, None)
        .await
        .unwrap();
    assert!(!report.valid);
    assert_eq!(report.failed_check().unwrap().name, "within_validity");
}

// =========================================================================
// Partial failure and retry
// =========================================================================

#[tokio::test]
async fn test_unrecorded_claim_can_be_resubmitted() {
    let f = IssuerFixture::with_kyc_schema(8).await.unwrap();
    f.ledger.set_rejecting_writes(true);

    let err = f
        .issuer
        .issue_claim(&f.kyc_claim("kyc-008", "did:example:heidi"), &f.key, &TxOptions::new())
        .await
        .unwrap_err();
    assert!(!err.is_input_error());
    assert!(matches!(
        err,
        ClaimError::Unrecorded {
            source: LedgerError::Contract(_),
            ..
        }
    ));
    let pending = err.unrecorded_claim().cloned().unwrap();
    assert!(f
        .issuer
        .verifier()
        .verify_offline(&pending, &f.key.public_key())
        .unwrap());

    f.ledger.set_rejecting_writes(false);
    let recorded = f
        .issuer
        .submit_claim(&pending, &f.key, &TxOptions::new())
        .await
        .unwrap();
    assert_eq!(f.ledger.claim_state("kyc-008"), Some(ClaimState::Issued));
    assert!(f
        .issuer
        .verifier()
        .validate_claim(&recorded, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_offline_ledger_during_issuance() {
    let f = IssuerFixture::with_kyc_schema(9).await.unwrap();
    f.ledger.set_offline(true);

    let err = f
        .issuer
        .issue_claim(&f.kyc_claim("kyc-009", "did:example:ivan"), &f.key, &TxOptions::new())
        .await
        .unwrap_err();
    // Schema fetch fails first, so nothing was signed
    assert!(matches!(err, ClaimError::Ledger(LedgerError::Network(_))));
    assert!(err.unrecorded_claim().is_none());
}

// =========================================================================
// Concurrency and transaction options
// =========================================================================

#[tokio::test]
async fn test_concurrent_issuance() {
    let f = Arc::new(IssuerFixture::with_kyc_schema(10).await.unwrap());
    let before = f.ledger.transaction_count();

    let tasks = (0..16u8).map(|i| {
        let f = f.clone();
        async move {
            let owner = holder_did(i);
            let claim = f.kyc_claim(&format!("batch-{}", i), owner.as_str());
            f.issuer.issue_claim(&claim, &f.key, &TxOptions::new()).await
        }
    });
    let results = join_all(tasks).await;

    assert!(results.iter().all(|r| r.is_ok()));
    let owners: std::collections::BTreeSet<_> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|c| c.owner_did.clone())
        .collect();
    assert_eq!(owners.len(), 16);
    assert!(owners.iter().all(|d| d.as_str().starts_with("did:key:z")));
    assert_eq!(f.ledger.transaction_count(), before + 16);
    for i in 0..16 {
        assert_eq!(
            f.ledger.claim_state(&format!("batch-{}", i)),
            Some(ClaimState::Issued)
        );
    }
}

#[tokio::test]
async fn test_duplicate_concurrent_issuance_records_once() {
    let f = Arc::new(IssuerFixture::with_kyc_schema(11).await.unwrap());
    let claim = f.kyc_claim("dup", "did:example:judy");

    let results = join_all((0..4).map(|_| {
        let f = f.clone();
        let claim = claim.clone();
        async move { f.issuer.issue_claim(&claim, &f.key, &TxOptions::new()).await }
    }))
    .await;

    let recorded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(recorded, 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
        e,
        ClaimError::Unrecorded {
            source: LedgerError::ClaimAlreadyRecorded(_),
            ..
        }
    )));
}

#[tokio::test]
async fn test_configured_gas_reaches_ledger() {
    let config = VouchConfig {
        ledger: LedgerConfig {
            default_gas: Some(90_000),
            ..LedgerConfig::default()
        },
        ..VouchConfig::default()
    };
    let f = IssuerFixture::with_kyc_schema(12).await.unwrap();
    let options = TxOptions::from_config(&config.ledger).with_output("addr-fee", 5);

    let issued = f
        .issuer
        .issue_claim(&f.kyc_claim("kyc-012", "did:example:ken"), &f.key, &options)
        .await
        .unwrap();

    let record = f.ledger.transaction(issued.tx.as_ref().unwrap()).unwrap();
    assert_eq!(record.operation, "inject_claim");
    assert_eq!(record.subject, "kyc-012");
    assert_eq!(record.options.gas, Some(90_000));
    assert_eq!(record.options.extra_outputs.len(), 1);
}
