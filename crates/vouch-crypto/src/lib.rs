//! Vouch Crypto: the signing primitive behind claim issuance.
//!
//! Ed25519 key pairs sign the BLAKE3 content hash of a claim; verifiers
//! recompute the hash and check the signature against the issuer's key.

pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::{hash, hash_fields, hash_hex, Hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, sign_digest, verify, verify_digest, Signature};
