//! Shared test helpers.

use bmail_wallet::{KdfParams, PasswordCipher, WalletManager, WalletRecord, X25519Agreement};

/// Passphrase used by most scenarios.
pub const PASSPHRASE: &str = "correct-horse";

/// Argon2 costs low enough to keep the suite fast.
pub fn fast_kdf() -> KdfParams {
    KdfParams {
        m_cost: 64,
        t_cost: 1,
        p_cost: 1,
    }
}

/// Manager with the default capabilities and [`fast_kdf`] costs.
pub fn fast_manager() -> WalletManager {
    WalletManager::new(PasswordCipher::new(fast_kdf()), X25519Agreement)
}

/// Serialize and reload, producing the locked at-rest form of `record`.
pub fn reload(record: &WalletRecord) -> WalletRecord {
    let bytes = record.serialize().expect("serialize wallet");
    WalletRecord::load(&bytes).expect("reload wallet")
}

/// Public key bytes of an Ed25519 key derived from a repeated seed byte.
pub fn pubkey(seed: u8) -> [u8; 32] {
    ed25519_dalek::SigningKey::from_bytes(&[seed; 32])
        .verifying_key()
        .to_bytes()
}
