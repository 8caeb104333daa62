//! Wallet error types.

use bmail_core::error::{AddressError, CryptoError};
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Random source or key-pair generation failed.
    #[error("key generation: {0}")]
    Generation(String),

    /// Encryption capability failure.
    #[error("encryption: {0}")]
    Encryption(String),

    /// Decryption capability failure (corrupted or unsupported ciphertext).
    #[error("decryption: {0}")]
    Decryption(String),

    /// Wrong passphrase, or the decrypted key does not belong to the
    /// stored address. The two cases are reported identically.
    #[error("wrong passphrase or corrupted wallet")]
    AuthenticationFailed,

    /// Operation needs the private key but the wallet is locked.
    #[error("wallet is locked")]
    Locked,

    /// Persisted wallet data could not be parsed or failed validation.
    #[error("malformed wallet: {0}")]
    Malformed(String),

    /// Supplied address failed structural validation.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// Key or signature error from bmail-core.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Shared-key derivation failure.
    #[error("key agreement: {0}")]
    KeyAgreement(String),

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}
