/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
