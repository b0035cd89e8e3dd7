use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}
