//! bmail-cli: command-line front end for a BMail identity wallet.
//!
//! Creates a wallet, shows and validates addresses, and performs the
//! operations that need the unlocked key (signing, seed export, shared-key
//! derivation). Passphrases are always read from the terminal.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use bmail_core::{Address, verify_with_address};
use bmail_wallet::{
    PasswordCipher, WalletManager, WalletRecord, X25519Agreement, load_from_path, save_to_path,
};

use crate::config::Config;

/// BMail identity wallet.
#[derive(Parser)]
#[command(name = "bmail-cli")]
#[command(version, about = "Manage a BMail identity wallet.")]
struct Cli {
    /// Path to wallet file (default: $BMAIL_WALLET_PATH or ~/.bmail/wallet.json).
    #[arg(short, long, global = true)]
    wallet: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet.
    Create(CreateArgs),
    /// Show the wallet's address and alias.
    Show,
    /// Check whether an address is well formed.
    Validate {
        address: String,
    },
    /// Set the wallet's display alias.
    Alias {
        name: String,
    },
    /// Sign a message with the wallet key.
    Sign {
        message: String,
    },
    /// Verify a hex signature against an address.
    Verify(VerifyArgs),
    /// Print the raw secret seed (hex).
    ExportSeed,
    /// Derive the symmetric key shared with a peer address.
    SharedKey {
        peer: String,
    },
}

#[derive(Args)]
struct CreateArgs {
    /// Display alias to store with the wallet.
    #[arg(short, long)]
    alias: Option<String>,

    /// Overwrite an existing wallet file.
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct VerifyArgs {
    address: String,
    message: String,
    /// Hex-encoded 64-byte signature.
    signature: String,
}

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    let cli = Cli::parse();
    let wallet_path = cli.wallet.unwrap_or_else(|| config.wallet_path.clone());
    let manager = WalletManager::new(PasswordCipher::new(config.kdf), X25519Agreement);
    debug!(path = %wallet_path.display(), "using wallet file");

    match cli.command {
        Commands::Create(args) => wallet_create(&manager, &wallet_path, args),
        Commands::Show => wallet_show(&wallet_path),
        Commands::Validate { address } => address_validate(&address),
        Commands::Alias { name } => wallet_alias(&wallet_path, name),
        Commands::Sign { message } => wallet_sign(&manager, &wallet_path, &message),
        Commands::Verify(args) => signature_verify(args),
        Commands::ExportSeed => wallet_export_seed(&manager, &wallet_path),
        Commands::SharedKey { peer } => wallet_shared_key(&manager, &wallet_path, &peer),
    }
}

/// Create and save a new wallet.
fn wallet_create(manager: &WalletManager, path: &Path, args: CreateArgs) -> Result<()> {
    if path.exists() && !args.force {
        bail!("Wallet file already exists: {}", path.display());
    }

    let passphrase = prompt_password("Enter wallet passphrase")?;
    let confirm = prompt_password("Confirm passphrase")?;
    if passphrase != confirm {
        bail!("Passphrases do not match");
    }

    let mut wallet = manager.create(&passphrase).context("Failed to create wallet")?;
    if let Some(alias) = args.alias {
        wallet.set_alias(alias);
    }

    // Create wallet directory if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    save_to_path(&wallet, path).context("Failed to save wallet")?;

    println!("\n=== WALLET CREATED ===");
    println!("Address: {}", wallet.address());
    println!("Wallet saved to: {}", path.display());
    println!("\nWARNING: The passphrase cannot be recovered. Keep it safe.");
    Ok(())
}

/// Display public wallet details. No passphrase needed.
fn wallet_show(path: &Path) -> Result<()> {
    let wallet = load_wallet(path)?;
    println!("Address: {}", wallet.address());
    if !wallet.alias().is_empty() {
        println!("Alias:   {}", wallet.alias());
    }
    println!("Version: {}", wallet.version());
    Ok(())
}

/// Report whether an address is structurally valid.
fn address_validate(address: &str) -> Result<()> {
    match Address::from(address).validate() {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(e) => bail!("invalid address: {e}"),
    }
}

/// Set the alias and save. The wallet stays locked.
fn wallet_alias(path: &Path, name: String) -> Result<()> {
    let mut wallet = load_wallet(path)?;
    wallet.set_alias(name);
    save_to_path(&wallet, path).context("Failed to save wallet")?;
    println!("Alias set to: {}", wallet.alias());
    Ok(())
}

/// Sign a UTF-8 message and print the hex signature.
fn wallet_sign(manager: &WalletManager, path: &Path, message: &str) -> Result<()> {
    let wallet = unlock_wallet(manager, path)?;
    let signature = wallet.sign(message.as_bytes())?;
    println!("{}", hex::encode(signature));
    Ok(())
}

/// Verify a hex signature against an address.
fn signature_verify(args: VerifyArgs) -> Result<()> {
    let address = Address::parse(&args.address).context("Invalid address")?;
    let signature = hex::decode(args.signature.trim()).context("Signature must be hex")?;
    verify_with_address(&address, args.message.as_bytes(), &signature)
        .context("Signature is NOT valid")?;
    println!("Signature is valid");
    Ok(())
}

/// Print the secret seed after unlocking.
fn wallet_export_seed(manager: &WalletManager, path: &Path) -> Result<()> {
    let wallet = unlock_wallet(manager, path)?;
    let seed = wallet.export_seed().context("Wallet is locked")?;
    println!("\nWARNING: Anyone with this seed controls your identity.");
    println!("{}", hex::encode(seed.as_bytes()));
    Ok(())
}

/// Print the symmetric key shared with `peer`.
fn wallet_shared_key(manager: &WalletManager, path: &Path, peer: &str) -> Result<()> {
    let peer = Address::parse(peer).context("Invalid peer address")?;
    let wallet = unlock_wallet(manager, path)?;
    let key = manager
        .shared_key_with(&wallet, &peer)
        .context("Failed to derive shared key")?;
    println!("{}", hex::encode(key.as_bytes()));
    Ok(())
}

fn load_wallet(path: &Path) -> Result<WalletRecord> {
    load_from_path(path).with_context(|| format!("Failed to load wallet: {}", path.display()))
}

fn unlock_wallet(manager: &WalletManager, path: &Path) -> Result<WalletRecord> {
    let mut wallet = load_wallet(path)?;
    let passphrase = prompt_password("Wallet passphrase")?;
    manager
        .open(&mut wallet, &passphrase)
        .context("Failed to unlock wallet")?;
    Ok(wallet)
}

/// Prompt for a password securely (no echo).
fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", prompt)).context("Failed to read password")
}
