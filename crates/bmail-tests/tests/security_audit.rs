//! BMail wallet adversarial test suite.
//!
//! Each section names the attack or misuse it exercises and the invariant
//! that must hold.

use bmail_core::{Address, verify_with_address};
use bmail_tests::helpers::{PASSPHRASE, fast_kdf, fast_manager, pubkey, reload};
use bmail_wallet::{
    KeyCipher, PasswordCipher, WalletError, WalletRecord, load_from_path, save_to_path,
};
use ed25519_dalek::SigningKey;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

// ======================================================================
// Create -> persist -> open
// ======================================================================

#[test]
fn create_serialize_load_open_roundtrip() {
    let m = fast_manager();
    let wallet = m.create(PASSPHRASE).unwrap();

    let mut loaded = WalletRecord::load(&wallet.serialize().unwrap()).unwrap();
    assert!(!loaded.is_open());
    m.open(&mut loaded, PASSPHRASE).unwrap();

    assert!(loaded.is_open());
    assert_eq!(loaded.address(), wallet.address());
    assert_eq!(loaded.cipher_text(), wallet.cipher_text());
}

#[test]
fn deterministic_identity_from_seeded_rng() {
    let m = fast_manager();
    let wallet = m
        .create_with_rng(PASSPHRASE, &mut StdRng::seed_from_u64(2024))
        .unwrap();

    let mut seed = [0u8; 32];
    StdRng::seed_from_u64(2024).fill_bytes(&mut seed);
    let public = SigningKey::from_bytes(&seed).verifying_key().to_bytes();

    assert_eq!(
        wallet.address().as_str(),
        format!("BM{}", bs58::encode(public).into_string())
    );

    let recovered = PasswordCipher::new(fast_kdf())
        .decrypt(&public, wallet.cipher_text(), PASSPHRASE)
        .unwrap();
    assert_eq!(recovered.as_slice(), &seed);
}

#[test]
fn file_roundtrip_comes_back_locked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");
    let m = fast_manager();

    let wallet = m.create(PASSPHRASE).unwrap();
    assert!(wallet.is_open());
    save_to_path(&wallet, &path).unwrap();

    let mut loaded = load_from_path(&path).unwrap();
    assert!(!loaded.is_open());
    m.open(&mut loaded, PASSPHRASE).unwrap();
    assert_eq!(loaded.address(), wallet.address());
}

// ======================================================================
// Attack: passphrase guessing
// Invariant: any passphrase other than the original fails with the single
// AuthenticationFailed error and leaves the record locked.
// ======================================================================

#[test]
fn near_miss_passphrases_are_rejected() {
    let m = fast_manager();
    let wallet = m.create(PASSPHRASE).unwrap();

    for guess in ["", "correct-hors", "Correct-horse", "correct-horse ", "correct_horse"] {
        let mut loaded = reload(&wallet);
        assert_eq!(
            m.open(&mut loaded, guess).unwrap_err(),
            WalletError::AuthenticationFailed,
            "guess {guess:?} must not unlock"
        );
        assert!(!loaded.is_open());
    }
}

// ======================================================================
// Attack: ciphertext tampering
// Invariant: a modified ciphertext never unlocks the wallet.
// ======================================================================

#[test]
fn tampered_cipher_text_never_unlocks() {
    let m = fast_manager();
    let wallet = m.create(PASSPHRASE).unwrap();
    let original = wallet.cipher_text().to_string();

    for pos in (0..original.len()).step_by(7) {
        let mut chars: Vec<char> = original.chars().collect();
        chars[pos] = if chars[pos] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();

        let json = format!(
            r#"{{"version":1,"address":"{}","bmail":"","cipher":"{}"}}"#,
            wallet.address(),
            tampered
        );
        let mut forged = WalletRecord::load_str(&json).unwrap();
        let err = m.open(&mut forged, PASSPHRASE).unwrap_err();
        assert!(
            matches!(
                err,
                WalletError::AuthenticationFailed | WalletError::Decryption(_)
            ),
            "position {pos}: unexpected {err:?}"
        );
        assert!(!forged.is_open());
    }
}

// ======================================================================
// Attack: address substitution
// Invariant: pairing a victim's ciphertext with another address fails,
// even when the attacker knows the passphrase.
// ======================================================================

#[test]
fn address_substitution_is_detected() {
    let m = fast_manager();
    let victim = m.create(PASSPHRASE).unwrap();
    let attacker = m.create(PASSPHRASE).unwrap();

    let json = format!(
        r#"{{"version":1,"address":"{}","bmail":"","cipher":"{}"}}"#,
        attacker.address(),
        victim.cipher_text()
    );
    let mut forged = WalletRecord::load_str(&json).unwrap();
    assert_eq!(
        m.open(&mut forged, PASSPHRASE).unwrap_err(),
        WalletError::AuthenticationFailed
    );
}

// ======================================================================
// Lock discipline
// ======================================================================

#[test]
fn closed_wallet_refuses_secret_operations() {
    let m = fast_manager();
    let mut wallet = m.create(PASSPHRASE).unwrap();
    wallet.close();

    assert!(!wallet.is_open());
    assert!(wallet.export_seed().is_none());
    assert_eq!(wallet.sign(b"msg").unwrap_err(), WalletError::Locked);
    assert_eq!(
        m.derive_shared_key(&wallet, &pubkey(1)).unwrap_err(),
        WalletError::Locked
    );
}

#[test]
fn loaded_wallet_refuses_secret_operations_until_opened() {
    let m = fast_manager();
    let mut loaded = reload(&m.create(PASSPHRASE).unwrap());

    assert!(loaded.export_seed().is_none());
    assert_eq!(
        m.derive_shared_key(&loaded, &pubkey(2)).unwrap_err(),
        WalletError::Locked
    );

    m.open(&mut loaded, PASSPHRASE).unwrap();
    assert!(loaded.export_seed().is_some());
    assert!(m.derive_shared_key(&loaded, &pubkey(2)).is_ok());
}

#[test]
fn alias_is_mutable_while_locked() {
    let mut loaded = reload(&fast_manager().create(PASSPHRASE).unwrap());
    loaded.set_alias("frank@bmail");
    assert_eq!(reload(&loaded).alias(), "frank@bmail");
}

// ======================================================================
// Attack: key material leaking through persistence
// Invariant: the serialized form never contains the seed or the 64-byte
// keypair, in any common encoding, whether the wallet is open or not.
// ======================================================================

fn assert_no_leak(out: &[u8], seed: &[u8; 32], keypair: &[u8; 64]) {
    let text = String::from_utf8_lossy(out);
    assert!(!out.windows(32).any(|w| w == seed));
    assert!(!out.windows(64).any(|w| w == keypair));
    assert!(!text.contains(&hex::encode(seed)));
    assert!(!text.contains(&hex::encode(keypair)));
    assert!(!text.contains(&bs58::encode(seed).into_string()));
    assert!(!text.contains(&bs58::encode(keypair).into_string()));
}

#[test]
fn serialization_never_contains_private_key() {
    let m = fast_manager();
    let wallet = m.create(PASSPHRASE).unwrap();
    let seed = *wallet.export_seed().unwrap().as_bytes();
    let keypair = SigningKey::from_bytes(&seed).to_keypair_bytes();

    assert_no_leak(&wallet.serialize().unwrap(), &seed, &keypair);
    assert_no_leak(&wallet.serialize_pretty().unwrap(), &seed, &keypair);
    assert_no_leak(wallet.to_string().as_bytes(), &seed, &keypair);

    let mut reopened = reload(&wallet);
    m.open(&mut reopened, PASSPHRASE).unwrap();
    assert_no_leak(&reopened.serialize().unwrap(), &seed, &keypair);
}

#[test]
fn serialized_form_is_identical_open_or_closed() {
    let mut wallet = fast_manager().create(PASSPHRASE).unwrap();
    let open_bytes = wallet.serialize().unwrap();
    wallet.close();
    assert_eq!(wallet.serialize().unwrap(), open_bytes);
}

// ======================================================================
// Signatures and shared keys
// ======================================================================

#[test]
fn structured_signature_verifies_over_json() {
    #[derive(serde::Serialize)]
    struct Mail<'a> {
        from: &'a str,
        subject: &'a str,
    }

    let wallet = fast_manager().create(PASSPHRASE).unwrap();
    let mail = Mail {
        from: wallet.address().as_str(),
        subject: "hi",
    };
    let sig = wallet.sign_structured(&mail).unwrap();
    let canonical = serde_json::to_vec(&mail).unwrap();
    assert!(verify_with_address(wallet.address(), &canonical, &sig).is_ok());
}

#[test]
fn signature_from_other_wallet_fails() {
    let m = fast_manager();
    let a = m.create(PASSPHRASE).unwrap();
    let b = m.create(PASSPHRASE).unwrap();
    let sig = a.sign(b"message").unwrap();
    assert!(verify_with_address(b.address(), b"message", &sig).is_err());
}

#[test]
fn shared_key_agreement_across_reload() {
    let m = fast_manager();
    let alice = m.create(PASSPHRASE).unwrap();
    let mut bob = reload(&m.create(PASSPHRASE).unwrap());
    m.open(&mut bob, PASSPHRASE).unwrap();

    let ab = m.shared_key_with(&alice, bob.address()).unwrap();
    let ba = m.shared_key_with(&bob, alice.address()).unwrap();
    assert_eq!(ab.as_bytes(), ba.as_bytes());
}

#[test]
fn shared_key_rejects_malformed_peer() {
    let wallet = fast_manager().create(PASSPHRASE).unwrap();
    let m = fast_manager();
    assert!(matches!(
        m.derive_shared_key(&wallet, &[0u8; 5]),
        Err(WalletError::KeyAgreement(_))
    ));
    assert!(matches!(
        m.shared_key_with(&wallet, &Address::from("XX1234")),
        Err(WalletError::InvalidAddress(_))
    ));
}

// ======================================================================
// Malformed persisted input
// ======================================================================

#[test]
fn malformed_records_are_rejected() {
    let good = fast_manager().create(PASSPHRASE).unwrap();
    let cases = [
        String::new(),
        "[]".to_string(),
        r#"{"version":1}"#.to_string(),
        format!(r#"{{"version":"1","address":"{}","cipher":"00"}}"#, good.address()),
        format!(r#"{{"version":1,"address":"BM{}","cipher":"00"}}"#, "1".repeat(10)),
        format!(r#"{{"version":0,"address":"{}","cipher":"00"}}"#, good.address()),
    ];
    for case in &cases {
        assert!(
            matches!(WalletRecord::load_str(case), Err(WalletError::Malformed(_))),
            "accepted: {case}"
        );
    }
}
