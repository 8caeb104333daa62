//! Wallet records on disk.
//!
//! Records are stored as indented JSON. Writes go to a sibling temp file
//! first and are renamed into place, so a crash never leaves a truncated
//! wallet behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::WalletError;
use crate::wallet::WalletRecord;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn open_for_write(path: &Path) -> std::io::Result<fs::File> {
    // A stale temp file keeps its old mode when reopened.
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn write_temp(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = open_for_write(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    restrict_permissions(path)
}

/// Write `record` to `path`, replacing any existing file.
pub fn save_to_path(record: &WalletRecord, path: &Path) -> Result<(), WalletError> {
    let data = record.serialize_pretty()?;
    let tmp = temp_path(path);

    if let Err(e) = write_temp(&tmp, &data).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(WalletError::Io(e.to_string()));
    }
    info!(path = %path.display(), address = %record.address(), "wallet saved");
    Ok(())
}

/// Read a wallet record from `path`. The record comes back locked.
pub fn load_from_path(path: &Path) -> Result<WalletRecord, WalletError> {
    let data = fs::read(path).map_err(|e| WalletError::Io(e.to_string()))?;
    WalletRecord::load(&data)
}
