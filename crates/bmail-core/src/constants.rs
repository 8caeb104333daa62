//! Scheme constants. Changing any of these changes the address format or
//! the persisted wallet schema.

/// Fixed prefix of every BMail address.
pub const ADDRESS_PREFIX: &str = "BM";

/// An address must be strictly longer than this to be valid.
///
/// Prefix (2) plus a conservative lower bound on the base58 length of a
/// 32-byte key. Real Ed25519 keys encode to 43 or 44 characters.
pub const MIN_ADDRESS_LEN: usize = 40;

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Ed25519 secret key (seed) length in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Schema tag written into every persisted wallet record.
pub const WALLET_VERSION: u32 = 1;
