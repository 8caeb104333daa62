//! Shared-key derivation between two BMail identities.
//!
//! Both sides hold Ed25519 keys. [`X25519Agreement`] maps them onto
//! Curve25519 (RFC 7748 / RFC 8032 conversion), runs Diffie-Hellman and
//! feeds the result through BLAKE3 to get a 256-bit AES key. Each party
//! derives the same key from its own secret and the other's public key.

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha512};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use bmail_core::constants::PUBLIC_KEY_LEN;

use crate::error::WalletError;

/// BLAKE3 KDF context for the symmetric key derived from a DH output.
const SHARED_KEY_CONTEXT: &str = "bmail shared aes key v1";

/// Derives a symmetric key from a peer's public key and our signing key.
pub trait KeyAgreement: Send + Sync {
    fn derive_shared_key(
        &self,
        peer_public_key: &[u8],
        local: &SigningKey,
    ) -> Result<SharedKey, WalletError>;
}

/// 32-byte symmetric key shared with a peer.
///
/// Zeroized on drop. No `Clone`; `Debug` is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; 32]);

impl SharedKey {
    /// Returns the raw 32-byte key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedKey([REDACTED])")
    }
}

/// X25519 Diffie-Hellman over Ed25519 identity keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519Agreement;

/// Lower half of SHA-512(seed): the Ed25519 secret scalar before clamping.
fn secret_scalar(local: &SigningKey) -> Zeroizing<[u8; 32]> {
    let mut seed = local.to_bytes();
    let mut hash = Sha512::digest(seed);
    seed.zeroize();

    let mut scalar = Zeroizing::new([0u8; 32]);
    scalar.copy_from_slice(&hash[..32]);
    hash.as_mut_slice().zeroize();
    scalar
}

impl KeyAgreement for X25519Agreement {
    fn derive_shared_key(
        &self,
        peer_public_key: &[u8],
        local: &SigningKey,
    ) -> Result<SharedKey, WalletError> {
        let peer: [u8; PUBLIC_KEY_LEN] = peer_public_key.try_into().map_err(|_| {
            WalletError::KeyAgreement(format!(
                "peer key must be {PUBLIC_KEY_LEN} bytes, got {}",
                peer_public_key.len()
            ))
        })?;

        let point = CompressedEdwardsY(peer)
            .decompress()
            .ok_or_else(|| WalletError::KeyAgreement("peer key is not a curve point".into()))?;
        if point.is_small_order() {
            return Err(WalletError::KeyAgreement("peer key has small order".into()));
        }

        let scalar = secret_scalar(local);
        let mut dh = point.to_montgomery().mul_clamped(*scalar).to_bytes();
        if dh == [0u8; 32] {
            return Err(WalletError::KeyAgreement("degenerate shared secret".into()));
        }

        let key = blake3::derive_key(SHARED_KEY_CONTEXT, &dh);
        dh.zeroize();
        Ok(SharedKey(key))
    }
}
