//! Address encoding for the BMail network.
//!
//! An address is the fixed prefix [`ADDRESS_PREFIX`] followed by the base58
//! encoding of a raw 32-byte Ed25519 public key:
//!
//! ```text
//! "BM" || base58(public_key)
//! ```
//!
//! There is no checksum. Validation is purely structural: the string must
//! be longer than [`MIN_ADDRESS_LEN`], start with the prefix, and its
//! payload must decode to exactly [`PUBLIC_KEY_LEN`] bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{ADDRESS_PREFIX, MIN_ADDRESS_LEN, PUBLIC_KEY_LEN};
use crate::crypto::PublicKey;
use crate::error::{AddressError, CryptoError};

/// A BMail address string.
///
/// Addresses are derived from a public key and never edited. Conversions
/// from `String`/`&str` wrap the value as-is so that arbitrary input can be
/// inspected with [`Address::is_valid`]; use [`Address::parse`] when the
/// value must be valid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Encode a raw public key as an address.
    ///
    /// The key length is not checked here.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let encoded = bs58::encode(public_key).into_string();
        let mut s = String::with_capacity(ADDRESS_PREFIX.len() + encoded.len());
        s.push_str(ADDRESS_PREFIX);
        s.push_str(&encoded);
        Self(s)
    }

    /// Parse and validate an address string.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let addr = Self(s.to_string());
        addr.validate()?;
        Ok(addr)
    }

    /// Decode the payload after the prefix.
    ///
    /// Returns `None` if the string is no longer than the prefix or the
    /// payload is not base58. The prefix itself is not compared.
    pub fn to_public_key_bytes(&self) -> Option<Vec<u8>> {
        if self.0.len() <= ADDRESS_PREFIX.len() {
            return None;
        }
        let payload = self.0.get(ADDRESS_PREFIX.len()..)?;
        bs58::decode(payload).into_vec().ok()
    }

    /// Decode the address into an Ed25519 public key.
    pub fn to_public_key(&self) -> Result<PublicKey, CryptoError> {
        self.validate()?;
        let bytes = self
            .to_public_key_bytes()
            .ok_or_else(|| AddressError::InvalidBase58(self.0.clone()))?;
        let key: [u8; PUBLIC_KEY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        PublicKey::from_bytes(&key)
    }

    /// Check the structural rules, reporting the first one that fails.
    pub fn validate(&self) -> Result<(), AddressError> {
        if self.0.len() <= MIN_ADDRESS_LEN {
            return Err(AddressError::TooShort {
                len: self.0.len(),
                min: MIN_ADDRESS_LEN,
            });
        }
        if !self.0.starts_with(ADDRESS_PREFIX) {
            return Err(AddressError::InvalidPrefix {
                expected: ADDRESS_PREFIX,
            });
        }
        let payload = self
            .to_public_key_bytes()
            .ok_or_else(|| AddressError::InvalidBase58(self.0.clone()))?;
        if payload.len() != PUBLIC_KEY_LEN {
            return Err(AddressError::InvalidKeyLength {
                got: payload.len(),
                expected: PUBLIC_KEY_LEN,
            });
        }
        Ok(())
    }

    /// True iff the address passes every structural rule.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the address string in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty address.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
