use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Ed25519 signing key held by an issuer or a root-of-trust operator.
///
/// The key never leaves this type except through [`KeyPair::secret_bytes`];
/// claim signing and ledger authorisation borrow it.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh key pair from OS entropy.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Key pair from raw secret bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    /// The verifying half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Raw secret bytes. Callers own the zeroizing of the copy.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key used to check claim signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Parse from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Base58 form, used when deriving `did:key`-style identifiers.
    pub fn to_bs58(&self) -> String {
        bs58::encode(self.as_bytes()).into_string()
    }

    pub fn from_bs58(bs58_str: &str) -> Result<Self, CryptoError> {
        let bytes = bs58::decode(bs58_str)
            .into_vec()
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}
