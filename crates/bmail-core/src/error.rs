//! Error types for address handling and signature checks.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address too short: {len} <= {min}")] TooShort { len: usize, min: usize },
    #[error("invalid prefix: expected {expected}")] InvalidPrefix { expected: &'static str },
    #[error("invalid base58 payload: {0}")] InvalidBase58(String),
    #[error("invalid key length: got {got}, expected {expected}")] InvalidKeyLength { got: usize, expected: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error(transparent)] Address(#[from] AddressError),
}
