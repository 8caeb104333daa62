//! Secret key material handed out by an unlocked wallet.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use bmail_core::constants::SECRET_KEY_LEN;

/// The 32-byte Ed25519 seed behind a wallet's signing key.
///
/// Zeroized on drop. `Debug` never prints the bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; SECRET_KEY_LEN],
}

impl Seed {
    /// Create a seed from raw bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Get the raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.bytes
    }
}

impl From<&ed25519_dalek::SigningKey> for Seed {
    fn from(key: &ed25519_dalek::SigningKey) -> Self {
        Self::from_bytes(key.to_bytes())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
