//! Passphrase encryption of the wallet's secret key.
//!
//! The wallet talks to this through the [`KeyCipher`] trait and never looks
//! inside the ciphertext. [`PasswordCipher`] is the default scheme:
//! Argon2id stretches the passphrase, AES-256-GCM seals the key with the
//! matching public key as associated data.
//!
//! # Wire format
//! ```text
//! scheme (1) || m_cost (4 LE) || t_cost (4 LE) || p_cost (4 LE)
//!     || salt (16) || nonce (12) || ciphertext + auth_tag
//! ```
//! The whole blob is hex encoded for storage in the wallet record.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Scheme tag for Argon2id + AES-256-GCM.
const SCHEME_ARGON2ID_AES256GCM: u8 = 1;

/// Scheme byte plus three little-endian u32 cost parameters.
const HEADER_LEN: usize = 1 + 4 * 3;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Derived AES key length in bytes.
const KEY_LEN: usize = 32;

/// Minimum encrypted payload size (header + salt + nonce + auth tag).
const MIN_ENCRYPTED_LEN: usize = HEADER_LEN + SALT_LEN + NONCE_LEN + TAG_LEN;

/// Largest Argon2 memory cost (KiB) for sealing or opening a ciphertext.
pub const MAX_M_COST: u32 = 1 << 20;

/// Largest Argon2 pass count for sealing or opening a ciphertext.
pub const MAX_T_COST: u32 = 64;

/// Largest Argon2 lane count for sealing or opening a ciphertext.
pub const MAX_P_COST: u32 = 16;

/// Protects a secret key under a passphrase, bound to its public key.
pub trait KeyCipher: Send + Sync {
    /// Encrypt `secret` under `passphrase`. The result is only decryptable
    /// together with the same `public_key`.
    fn encrypt(
        &self,
        secret: &[u8],
        public_key: &[u8],
        passphrase: &str,
    ) -> Result<String, WalletError>;

    /// Recover the secret sealed by [`KeyCipher::encrypt`].
    fn decrypt(
        &self,
        public_key: &[u8],
        cipher_text: &str,
        passphrase: &str,
    ) -> Result<Zeroizing<Vec<u8>>, WalletError>;
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of passes.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// True iff every cost is at or below its ceiling.
    pub fn within_limits(&self) -> bool {
        self.m_cost <= MAX_M_COST && self.t_cost <= MAX_T_COST && self.p_cost <= MAX_P_COST
    }
}

/// Argon2id + AES-256-GCM implementation of [`KeyCipher`].
///
/// The configured [`KdfParams`] only apply to new ciphertexts; decryption
/// uses the parameters recorded in the blob.
#[derive(Debug, Clone, Default)]
pub struct PasswordCipher {
    params: KdfParams,
}

impl PasswordCipher {
    /// Create a cipher that encrypts with the given Argon2 parameters.
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// Parameters used for new ciphertexts.
    pub fn params(&self) -> KdfParams {
        self.params
    }
}

/// Stretch a passphrase into a 256-bit AES key.
fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, argon2::Error> {
    let params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_LEN))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon.hash_password_into(passphrase, salt, &mut *key)?;
    Ok(key)
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

impl KeyCipher for PasswordCipher {
    fn encrypt(
        &self,
        secret: &[u8],
        public_key: &[u8],
        passphrase: &str,
    ) -> Result<String, WalletError> {
        if !self.params.within_limits() {
            return Err(WalletError::Encryption(format!(
                "kdf parameters out of range: {:?}",
                self.params
            )));
        }

        let mut salt = [0u8; SALT_LEN];
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| WalletError::Encryption(e.to_string()))?;
        rand::rngs::OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| WalletError::Encryption(e.to_string()))?;

        let key = derive_key(passphrase.as_bytes(), &salt, &self.params)
            .map_err(|e| WalletError::Encryption(e.to_string()))?;
        let cipher = Aes256Gcm::new_from_slice(&*key)
            .map_err(|e| WalletError::Encryption(e.to_string()))?;

        let sealed = cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: secret,
                    aad: public_key,
                },
            )
            .map_err(|e| WalletError::Encryption(e.to_string()))?;

        let mut blob = Vec::with_capacity(HEADER_LEN + SALT_LEN + NONCE_LEN + sealed.len());
        blob.push(SCHEME_ARGON2ID_AES256GCM);
        blob.extend_from_slice(&self.params.m_cost.to_le_bytes());
        blob.extend_from_slice(&self.params.t_cost.to_le_bytes());
        blob.extend_from_slice(&self.params.p_cost.to_le_bytes());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&sealed);
        Ok(hex::encode(blob))
    }

    /// Returns [`WalletError::AuthenticationFailed`] when the tag does not
    /// verify (wrong passphrase, wrong public key, or tampering) and
    /// [`WalletError::Decryption`] when the blob itself is unusable.
    fn decrypt(
        &self,
        public_key: &[u8],
        cipher_text: &str,
        passphrase: &str,
    ) -> Result<Zeroizing<Vec<u8>>, WalletError> {
        let blob = hex::decode(cipher_text)
            .map_err(|e| WalletError::Decryption(format!("invalid hex: {e}")))?;
        if blob.len() < MIN_ENCRYPTED_LEN {
            return Err(WalletError::Decryption(format!(
                "encrypted data too short: {} < {MIN_ENCRYPTED_LEN}",
                blob.len()
            )));
        }
        if blob[0] != SCHEME_ARGON2ID_AES256GCM {
            return Err(WalletError::Decryption(format!(
                "unsupported scheme: {}",
                blob[0]
            )));
        }

        let params = KdfParams {
            m_cost: read_u32_le(&blob, 1),
            t_cost: read_u32_le(&blob, 5),
            p_cost: read_u32_le(&blob, 9),
        };
        if !params.within_limits() {
            return Err(WalletError::Decryption(format!(
                "kdf parameters out of range: {params:?}"
            )));
        }

        let salt = &blob[HEADER_LEN..HEADER_LEN + SALT_LEN];
        let nonce_bytes = &blob[HEADER_LEN + SALT_LEN..HEADER_LEN + SALT_LEN + NONCE_LEN];
        let sealed = &blob[HEADER_LEN + SALT_LEN + NONCE_LEN..];

        let key = derive_key(passphrase.as_bytes(), salt, &params)
            .map_err(|e| WalletError::Decryption(e.to_string()))?;
        let cipher = Aes256Gcm::new_from_slice(&*key)
            .map_err(|e| WalletError::Decryption(e.to_string()))?;

        cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: sealed,
                    aad: public_key,
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| WalletError::AuthenticationFailed)
    }
}
