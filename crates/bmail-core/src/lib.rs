//! # bmail-core
//! Address codec and Ed25519 primitives shared by the BMail wallet and tools.

pub mod address;
pub mod constants;
pub mod crypto;
pub mod error;

pub use address::Address;
pub use crypto::{PublicKey, verify_with_address};
pub use error::{AddressError, CryptoError};
