//! Vouch Claims: the claim lifecycle and trust-verification protocol.
//!
//! Issuers register schemas, then create, sign, record and revoke claims.
//! Verifiers check structure, signature, revocation state, validity window
//! and root-of-trust membership.

pub mod claim;
pub mod error;
pub mod issuer;
pub mod trust;
pub mod verifier;

pub use claim::{Claim, ClaimAttributes};
pub use error::ClaimError;
pub use issuer::Issuer;
pub use trust::RootOfTrust;
pub use verifier::{ClaimPredicate, VerificationCheck, VerificationResult, Verifier};
