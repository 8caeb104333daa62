//! CLI configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bmail_wallet::KdfParams;
use bmail_wallet::encryption::{MAX_M_COST, MAX_T_COST};

#[derive(Clone, Debug)]
pub struct Config {
    /// Path to the wallet file.
    pub wallet_path: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Argon2 parameters for newly encrypted wallets.
    pub kdf: KdfParams,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let wallet_path = match lookup("BMAIL_WALLET_PATH") {
            Some(p) => PathBuf::from(p),
            None => default_wallet_path()?,
        };

        let log_filter = lookup("BMAIL_LOG").unwrap_or_else(|| "warn".to_string());

        let defaults = KdfParams::default();
        let m_cost = match lookup("BMAIL_KDF_MEMORY_KIB") {
            Some(v) => parse_cost("BMAIL_KDF_MEMORY_KIB", &v, MAX_M_COST)?,
            None => defaults.m_cost,
        };
        let t_cost = match lookup("BMAIL_KDF_ITERATIONS") {
            Some(v) => parse_cost("BMAIL_KDF_ITERATIONS", &v, MAX_T_COST)?,
            None => defaults.t_cost,
        };

        Ok(Config {
            wallet_path,
            log_filter,
            kdf: KdfParams {
                m_cost,
                t_cost,
                p_cost: defaults.p_cost,
            },
        })
    }
}

/// Parse an Argon2 cost in `1..=max`.
fn parse_cost(var: &str, value: &str, max: u32) -> Result<u32> {
    let cost: u32 = value
        .parse()
        .with_context(|| format!("{var} must be a positive integer"))?;
    if cost == 0 || cost > max {
        bail!("{var} must be between 1 and {max}, got {cost}");
    }
    Ok(cost)
}

/// `~/.bmail/wallet.json`.
fn default_wallet_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".bmail").join("wallet.json"))
}
