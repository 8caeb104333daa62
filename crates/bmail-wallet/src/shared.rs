//! Lock-guarded wallet handle for multi-threaded callers.
//!
//! Every operation takes the record's mutex for its full duration, so a
//! `close` can never interleave with a `sign`, `derive_shared_key` or
//! `export_seed` that is reading the resident key.

use std::sync::Arc;

use parking_lot::Mutex;

use bmail_core::address::Address;
use bmail_core::constants::SIGNATURE_LEN;

use crate::agreement::SharedKey;
use crate::error::WalletError;
use crate::keys::Seed;
use crate::wallet::{WalletManager, WalletRecord};

/// Cloneable, thread-safe handle to one wallet record.
#[derive(Clone)]
pub struct SharedWallet {
    record: Arc<Mutex<WalletRecord>>,
    manager: Arc<WalletManager>,
}

impl SharedWallet {
    pub fn new(record: WalletRecord, manager: Arc<WalletManager>) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
            manager,
        }
    }

    pub fn address(&self) -> Address {
        self.record.lock().address().clone()
    }

    pub fn alias(&self) -> String {
        self.record.lock().alias().to_string()
    }

    pub fn set_alias(&self, alias: impl Into<String>) {
        self.record.lock().set_alias(alias);
    }

    pub fn is_open(&self) -> bool {
        self.record.lock().is_open()
    }

    pub fn open(&self, passphrase: &str) -> Result<(), WalletError> {
        let mut record = self.record.lock();
        self.manager.open(&mut record, passphrase)
    }

    pub fn close(&self) {
        self.record.lock().close();
    }

    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN], WalletError> {
        self.record.lock().sign(message)
    }

    pub fn derive_shared_key(&self, peer_public_key: &[u8]) -> Result<SharedKey, WalletError> {
        let record = self.record.lock();
        self.manager.derive_shared_key(&record, peer_public_key)
    }

    pub fn export_seed(&self) -> Option<Seed> {
        self.record.lock().export_seed()
    }

    pub fn serialize(&self) -> Result<Vec<u8>, WalletError> {
        self.record.lock().serialize()
    }
}

impl std::fmt::Debug for SharedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWallet")
            .field("record", &*self.record.lock())
            .finish()
    }
}
