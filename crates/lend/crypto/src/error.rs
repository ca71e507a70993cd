use thiserror::Error;

/// Errors from identity, signature and commitment handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("bytes are not a valid Ed25519 public key")]
    InvalidPublicKey,

    #[error("malformed signature")]
    MalformedSignature,

    #[error("signature does not verify against identity {0}")]
    SignatureMismatch(String),
}
