//! Wallet lifecycle: create, lock/unlock, sign, persist.
//!
//! A [`WalletRecord`] carries the public identity (address, alias) and the
//! passphrase-encrypted secret key. The secret key is only resident while
//! the record is unlocked, and is never part of the serialized form.
//! [`WalletManager`] owns the encryption and key-agreement capabilities and
//! performs the operations that need them.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use bmail_core::address::Address;
use bmail_core::constants::{PUBLIC_KEY_LEN, SECRET_KEY_LEN, SIGNATURE_LEN, WALLET_VERSION};
use bmail_core::crypto::PublicKey;

use crate::agreement::{KeyAgreement, SharedKey, X25519Agreement};
use crate::encryption::{KeyCipher, PasswordCipher};
use crate::error::WalletError;
use crate::keys::Seed;

/// Whether the secret key is resident.
enum KeyState {
    Locked,
    Unlocked(SigningKey),
}

/// Persisted layout of a wallet record.
#[derive(Serialize, Deserialize)]
struct WalletFile {
    version: u32,
    address: Address,
    #[serde(rename = "bmail", default)]
    mail_alias: String,
    #[serde(rename = "cipher")]
    cipher_text: String,
}

/// A single identity: address, alias and encrypted secret key.
///
/// Created unlocked by [`WalletManager::create`], or locked by
/// [`WalletRecord::load`]. The address and ciphertext are fixed for the
/// life of the record.
pub struct WalletRecord {
    version: u32,
    address: Address,
    mail_alias: String,
    cipher_text: String,
    state: KeyState,
}

impl WalletRecord {
    /// The address derived from this wallet's public key.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Display alias, empty if unset.
    pub fn alias(&self) -> &str {
        &self.mail_alias
    }

    /// Set the display alias. Allowed whether locked or not.
    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.mail_alias = alias.into();
    }

    /// Schema version of the record.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The opaque encrypted secret key.
    pub fn cipher_text(&self) -> &str {
        &self.cipher_text
    }

    /// The public key encoded in the address.
    pub fn public_key(&self) -> Result<PublicKey, WalletError> {
        Ok(self.address.to_public_key()?)
    }

    /// True iff the secret key is resident.
    pub fn is_open(&self) -> bool {
        matches!(self.state, KeyState::Unlocked(_))
    }

    /// Drop the resident secret key. No-op when already locked.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!(address = %self.address, "wallet locked");
        }
        // SigningKey zeroizes itself on drop.
        self.state = KeyState::Locked;
    }

    fn signing_key(&self) -> Result<&SigningKey, WalletError> {
        match &self.state {
            KeyState::Unlocked(key) => Ok(key),
            KeyState::Locked => Err(WalletError::Locked),
        }
    }

    /// Sign raw bytes with the resident key.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN], WalletError> {
        Ok(self.signing_key()?.sign(message).to_bytes())
    }

    /// Sign the canonical JSON encoding of `value`.
    pub fn sign_structured<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<[u8; SIGNATURE_LEN], WalletError> {
        let key = self.signing_key()?;
        let canonical =
            serde_json::to_vec(value).map_err(|e| WalletError::Serialization(e.to_string()))?;
        Ok(key.sign(&canonical).to_bytes())
    }

    /// The raw seed of the resident key, or `None` while locked.
    pub fn export_seed(&self) -> Option<Seed> {
        match &self.state {
            KeyState::Unlocked(key) => Some(Seed::from(key)),
            KeyState::Locked => None,
        }
    }

    fn to_file(&self) -> WalletFile {
        WalletFile {
            version: self.version,
            address: self.address.clone(),
            mail_alias: self.mail_alias.clone(),
            cipher_text: self.cipher_text.clone(),
        }
    }

    /// Compact JSON of the persisted fields. Never includes the secret key.
    pub fn serialize(&self) -> Result<Vec<u8>, WalletError> {
        serde_json::to_vec(&self.to_file()).map_err(|e| WalletError::Serialization(e.to_string()))
    }

    /// Indented JSON of the persisted fields, as written to disk.
    pub fn serialize_pretty(&self) -> Result<Vec<u8>, WalletError> {
        serde_json::to_vec_pretty(&self.to_file())
            .map_err(|e| WalletError::Serialization(e.to_string()))
    }

    /// Parse a persisted record. The result is always locked.
    pub fn load(bytes: &[u8]) -> Result<Self, WalletError> {
        let file: WalletFile = serde_json::from_slice(bytes)
            .map_err(|e| WalletError::Malformed(format!("invalid json: {e}")))?;

        if file.version != WALLET_VERSION {
            return Err(WalletError::Malformed(format!(
                "unsupported version: {}",
                file.version
            )));
        }
        file.address
            .validate()
            .map_err(|e| WalletError::Malformed(format!("invalid address: {e}")))?;
        if file.cipher_text.is_empty() {
            return Err(WalletError::Malformed("missing cipher text".into()));
        }

        debug!(address = %file.address, "wallet record loaded");
        Ok(Self {
            version: file.version,
            address: file.address,
            mail_alias: file.mail_alias,
            cipher_text: file.cipher_text,
            state: KeyState::Locked,
        })
    }

    /// [`WalletRecord::load`] from a JSON string.
    pub fn load_str(json: &str) -> Result<Self, WalletError> {
        Self::load(json.as_bytes())
    }
}

impl fmt::Display for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.to_file()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("version", &self.version)
            .field("address", &self.address)
            .field("alias", &self.mail_alias)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

/// Creates and unlocks wallets using pluggable crypto capabilities.
pub struct WalletManager {
    cipher: Box<dyn KeyCipher>,
    agreement: Box<dyn KeyAgreement>,
}

impl Default for WalletManager {
    fn default() -> Self {
        Self::new(PasswordCipher::default(), X25519Agreement)
    }
}

impl WalletManager {
    /// Build a manager from an encryption and a key-agreement capability.
    pub fn new(
        cipher: impl KeyCipher + 'static,
        agreement: impl KeyAgreement + 'static,
    ) -> Self {
        Self {
            cipher: Box::new(cipher),
            agreement: Box::new(agreement),
        }
    }

    /// Generate a fresh identity from the OS RNG. Returned unlocked.
    pub fn create(&self, passphrase: &str) -> Result<WalletRecord, WalletError> {
        self.create_with_rng(passphrase, &mut rand::rngs::OsRng)
    }

    /// Generate a fresh identity from `rng`. Returned unlocked.
    pub fn create_with_rng<R: RngCore + CryptoRng>(
        &self,
        passphrase: &str,
        rng: &mut R,
    ) -> Result<WalletRecord, WalletError> {
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        rng.try_fill_bytes(&mut *seed)
            .map_err(|e| WalletError::Generation(e.to_string()))?;

        let signing_key = SigningKey::from_bytes(&seed);
        let public_key = signing_key.verifying_key().to_bytes();
        let cipher_text = self.cipher.encrypt(&*seed, &public_key, passphrase)?;
        let address = Address::from_public_key(&public_key);

        info!(%address, "wallet created");
        Ok(WalletRecord {
            version: WALLET_VERSION,
            address,
            mail_alias: String::new(),
            cipher_text,
            state: KeyState::Unlocked(signing_key),
        })
    }

    /// Unlock `record` with `passphrase`.
    ///
    /// The decrypted key must reproduce the public key in the address;
    /// otherwise this fails with [`WalletError::AuthenticationFailed`] and
    /// the record is left as it was.
    pub fn open(&self, record: &mut WalletRecord, passphrase: &str) -> Result<(), WalletError> {
        record.address.validate()?;
        let expected = record
            .address
            .to_public_key_bytes()
            .filter(|k| k.len() == PUBLIC_KEY_LEN)
            .ok_or_else(|| WalletError::Malformed("address has no public key".into()))?;

        let secret = self
            .cipher
            .decrypt(&expected, &record.cipher_text, passphrase)
            .inspect_err(|e| warn!(address = %record.address, error = %e, "wallet unlock failed"))?;

        if secret.len() != SECRET_KEY_LEN {
            warn!(address = %record.address, "decrypted key has wrong length");
            return Err(WalletError::AuthenticationFailed);
        }
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        seed.copy_from_slice(&secret);

        let signing_key = SigningKey::from_bytes(&seed);
        if signing_key.verifying_key().as_bytes().as_slice() != expected.as_slice() {
            warn!(address = %record.address, "decrypted key does not match address");
            return Err(WalletError::AuthenticationFailed);
        }

        record.state = KeyState::Unlocked(signing_key);
        info!(address = %record.address, "wallet unlocked");
        Ok(())
    }

    /// Derive a symmetric key shared with the owner of `peer_public_key`.
    pub fn derive_shared_key(
        &self,
        record: &WalletRecord,
        peer_public_key: &[u8],
    ) -> Result<SharedKey, WalletError> {
        let key = record.signing_key()?;
        self.agreement.derive_shared_key(peer_public_key, key)
    }

    /// [`WalletManager::derive_shared_key`] for a peer given by address.
    pub fn shared_key_with(
        &self,
        record: &WalletRecord,
        peer: &Address,
    ) -> Result<SharedKey, WalletError> {
        peer.validate()?;
        let peer_key = peer
            .to_public_key_bytes()
            .ok_or_else(|| WalletError::KeyAgreement("peer address has no public key".into()))?;
        self.derive_shared_key(record, &peer_key)
    }
}

impl fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletManager").finish_non_exhaustive()
    }
}
