use ed25519_dalek::Signer;
use ed25519_dalek::Verifier;

use crate::error::CryptoError;
use crate::hashing::Hash;
use crate::keys::{KeyPair, PublicKey};

/// Ed25519 signature (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inner: ed25519_dalek::Signature,
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; 64] {
        self.inner.to_bytes()
    }

    /// Parse from raw bytes (64 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::MalformedSignature(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self {
            inner: ed25519_dalek::Signature::from_bytes(&bytes_arr),
        })
    }

    /// Hex form, as stored on a claim.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| CryptoError::MalformedSignature(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

/// Sign a message using Ed25519.
pub fn sign(message: &[u8], keypair: &KeyPair) -> Signature {
    Signature {
        inner: keypair.signing_key().sign(message),
    }
}

/// Verify an Ed25519 signature.
pub fn verify(
    message: &[u8],
    signature: &Signature,
    pubkey: &PublicKey,
) -> Result<(), CryptoError> {
    pubkey
        .verifying_key()
        .verify(message, &signature.inner)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Sign a content digest. Claims are signed over their hash, not their bytes.
pub fn sign_digest(digest: &Hash, keypair: &KeyPair) -> Signature {
    sign(digest, keypair)
}

/// Verify a signature over a content digest.
pub fn verify_digest(
    digest: &Hash,
    signature: &Signature,
    pubkey: &PublicKey,
) -> Result<(), CryptoError> {
    verify(digest, signature, pubkey).inspect_err(|_| {
        tracing::trace!(pubkey = %pubkey.to_hex(), "digest signature rejected");
    })
}
