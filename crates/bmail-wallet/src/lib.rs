//! # bmail-wallet: passphrase-protected identity wallet.
//!
//! Generates an Ed25519 key pair, derives its BMail address, keeps the
//! secret key encrypted at rest and only resident in memory while the
//! wallet is unlocked.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`keys`]: `Seed`, the exportable secret key material
//! - [`encryption`]: `KeyCipher` trait, Argon2id + AES-256-GCM default
//! - [`agreement`]: `KeyAgreement` trait, X25519 shared-key default
//! - [`wallet`]: `WalletRecord` and `WalletManager`
//! - [`file`]: load/save of wallet records on disk
//! - [`shared`]: `SharedWallet`, a lock-guarded handle for threaded callers

pub mod agreement;
pub mod encryption;
pub mod error;
pub mod file;
pub mod keys;
pub mod shared;
pub mod wallet;

// Re-exports for convenient access
pub use agreement::{KeyAgreement, SharedKey, X25519Agreement};
pub use encryption::{KdfParams, KeyCipher, PasswordCipher};
pub use error::WalletError;
pub use file::{load_from_path, save_to_path};
pub use keys::Seed;
pub use shared::SharedWallet;
pub use wallet::{WalletManager, WalletRecord};
