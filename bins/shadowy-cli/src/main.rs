//! shadowy-cli: Command-line wallet interface for Shadowy.
//!
//! Manages wallet files, validates addresses, queries the node, and sends
//! ML-DSA-87 signed transactions.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use shadowy_client::{send, BroadcastStatus, ClientConfig, NodeClient};
use shadowy_core::address::{Address, AddressKind};
use shadowy_core::constants::{COIN, DEFAULT_FEE};
use shadowy_wallet::{FileStorage, WalletInfo, WalletStore};

/// Shadowy command-line wallet interface.
#[derive(Parser)]
#[command(name = "shadowy-cli")]
#[command(version, about = "Post-quantum wallet for the Shadowy network.")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides layered on top of `SHADOWY_*` environment variables.
#[derive(Args)]
struct GlobalArgs {
    /// Node API base URL (default: $SHADOWY_NODE_URL or http://127.0.0.1:8080/api/v1).
    #[arg(long, global = true)]
    node_url: Option<String>,

    /// API key sent as a bearer token (default: $SHADOWY_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Wallet directory (default: $SHADOWY_WALLET_DIR or ~/.shadowy).
    #[arg(long, global = true)]
    wallet_dir: Option<PathBuf>,

    /// Request timeout in seconds (default: $SHADOWY_TIMEOUT_SECS or 30).
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet management subcommands.
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Address subcommands.
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Query a wallet's balance from the node.
    Balance(WalletArg),
    /// Send a transaction.
    Send(SendArgs),
    /// Show node information.
    Info,
    /// Show node health.
    Health,
}

#[derive(Subcommand)]
enum WalletAction {
    /// Create a new wallet with a fresh seed.
    Create(NameArg),
    /// Load a wallet and show its details (migrates legacy records).
    Load(NameArg),
    /// List stored wallets.
    List,
    /// Delete a stored wallet.
    Delete(DeleteArgs),
    /// Replace a migrated legacy wallet with a freshly seeded one of the same name.
    Rekey(RekeyArgs),
}

#[derive(Subcommand)]
enum AddressAction {
    /// Print a wallet's address.
    Show(NameArg),
    /// Check whether an address is well-formed.
    Validate {
        /// Address to check.
        address: String,
    },
}

#[derive(Args)]
struct NameArg {
    /// Wallet name.
    name: String,
}

#[derive(Args)]
struct WalletArg {
    /// Wallet name.
    #[arg(short, long)]
    wallet: String,
}

#[derive(Args)]
struct DeleteArgs {
    /// Wallet name.
    name: String,

    /// Confirm deletion; the seed cannot be recovered afterwards.
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct RekeyArgs {
    /// Wallet name.
    name: String,

    /// Confirm the re-key; the previous key material is discarded.
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct SendArgs {
    /// Wallet to spend from.
    #[arg(short, long)]
    wallet: String,

    /// Recipient address.
    #[arg(short, long)]
    to: String,

    /// Amount to send in SHADOW (e.g., 10.5).
    #[arg(short, long)]
    amount: f64,

    /// Transaction fee in satoshis.
    #[arg(short, long, default_value_t = DEFAULT_FEE)]
    fee: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.global)?;

    match cli.command {
        Commands::Wallet { action } => match action {
            WalletAction::Create(args) => wallet_create(&config, args),
            WalletAction::Load(args) => wallet_load(&config, args),
            WalletAction::List => wallet_list(&config),
            WalletAction::Delete(args) => wallet_delete(&config, args),
            WalletAction::Rekey(args) => wallet_rekey(&config, args),
        },
        Commands::Address { action } => match action {
            AddressAction::Show(args) => address_show(&config, args),
            AddressAction::Validate { address } => address_validate(&address),
        },
        Commands::Balance(args) => balance(&config, args).await,
        Commands::Send(args) => send_transaction(&config, args).await,
        Commands::Info => node_info(&config).await,
        Commands::Health => node_health(&config).await,
    }
}

/// Environment configuration with command-line overrides applied.
fn resolve_config(global: &GlobalArgs) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid SHADOWY_* environment")?;
    if let Some(url) = &global.node_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(key) = &global.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(dir) = &global.wallet_dir {
        config.wallet_dir = dir.clone();
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            bail!("--timeout must be a positive number of seconds");
        }
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

fn open_store(config: &ClientConfig) -> WalletStore<FileStorage> {
    WalletStore::new(FileStorage::new(config.wallet_dir.clone()))
}

fn node_client(config: &ClientConfig) -> Result<NodeClient> {
    NodeClient::from_config(config).context("Failed to build node client")
}

// ---------------------------------------------------------------------------
// Wallet commands
// ---------------------------------------------------------------------------

fn wallet_create(config: &ClientConfig, args: NameArg) -> Result<()> {
    let mut store = open_store(config);
    let info = store
        .create(&args.name)
        .with_context(|| format!("Failed to create wallet '{}'", args.name))?;

    println!("\n=== WALLET CREATED ===");
    print_wallet(&info);
    println!("\nWallet saved to: {}", config.wallet_dir.display());
    println!("WARNING: The wallet file holds the seed. Anyone with it can spend your funds.");
    Ok(())
}

fn wallet_load(config: &ClientConfig, args: NameArg) -> Result<()> {
    let mut store = open_store(config);
    let info = store
        .load(&args.name)
        .with_context(|| format!("Failed to load wallet '{}'", args.name))?;

    println!("\n=== WALLET ===");
    print_wallet(&info);
    if info.requires_rekey {
        println!("\nThis wallet was migrated from a legacy record and cannot sign.");
        println!("Run `shadowy-cli wallet rekey {} --yes` to replace it.", info.name);
    }
    Ok(())
}

fn wallet_list(config: &ClientConfig) -> Result<()> {
    let store = open_store(config);
    let names = store.list();
    if names.is_empty() {
        println!("No wallets in {}", config.wallet_dir.display());
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn wallet_delete(config: &ClientConfig, args: DeleteArgs) -> Result<()> {
    if !args.yes {
        bail!("Refusing to delete '{}' without --yes", args.name);
    }
    let mut store = open_store(config);
    if !store.delete(&args.name) {
        bail!("Wallet not found: {}", args.name);
    }
    println!("Deleted wallet '{}'", args.name);
    Ok(())
}

fn wallet_rekey(config: &ClientConfig, args: RekeyArgs) -> Result<()> {
    if !args.yes {
        bail!("Refusing to re-key '{}' without --yes", args.name);
    }
    let mut store = open_store(config);
    let info = store
        .rekey(&args.name)
        .with_context(|| format!("Failed to re-key wallet '{}'", args.name))?;

    println!("\n=== WALLET RE-KEYED ===");
    print_wallet(&info);
    println!("\nFunds held by the previous address are not moved.");
    Ok(())
}

fn print_wallet(info: &WalletInfo) {
    println!("Name:    {}", info.name);
    println!("Address: {}", info.address);
    println!("Created: {}", info.created_at);
    if info.migrated {
        println!("Format:  legacy (migrated)");
    }
}

// ---------------------------------------------------------------------------
// Address commands
// ---------------------------------------------------------------------------

fn address_show(config: &ClientConfig, args: NameArg) -> Result<()> {
    let mut store = open_store(config);
    let info = store
        .load(&args.name)
        .with_context(|| format!("Failed to load wallet '{}'", args.name))?;
    println!("{}", info.address);
    Ok(())
}

fn address_validate(address: &str) -> Result<()> {
    match Address::decode(address) {
        Ok(decoded) => {
            let kind = match decoded.kind() {
                AddressKind::Standard => "standard",
                AddressKind::Liquidity => "liquidity",
            };
            println!("valid ({kind})");
            Ok(())
        }
        Err(e) => bail!("invalid address: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Node commands
// ---------------------------------------------------------------------------

async fn balance(config: &ClientConfig, args: WalletArg) -> Result<()> {
    let mut store = open_store(config);
    let info = store
        .load(&args.wallet)
        .with_context(|| format!("Failed to load wallet '{}'", args.wallet))?;
    let client = node_client(config)?;

    let balance = client
        .balance(&info.address)
        .await
        .context("Balance query failed")?;

    println!("\n=== BALANCE ===");
    println!("Address:     {}", info.address);
    println!("Balance:     {}", format_coins(balance.balance_satoshis));
    println!("Confirmed:   {}", format_coins(balance.confirmed_satoshis));
    println!("Unconfirmed: {}", format_coins(balance.unconfirmed_satoshis));
    println!("Tx count:    {}", balance.transaction_count);
    if let Some(last) = balance.last_activity {
        println!("Last seen:   {last}");
    }
    Ok(())
}

async fn send_transaction(config: &ClientConfig, args: SendArgs) -> Result<()> {
    let amount = parse_coins(args.amount)?;

    let mut store = open_store(config);
    store
        .load(&args.wallet)
        .with_context(|| format!("Failed to load wallet '{}'", args.wallet))?;
    let handle = store.require_active()?;
    let client = node_client(config)?;

    let outcome = send(&client, handle, &args.to, amount, args.fee)
        .await
        .context("Send failed")?;
    tracing::info!(
        wallet = %args.wallet,
        tx_hash = %outcome.tx_hash,
        status = ?outcome.result.status,
        "send finished"
    );

    match outcome.result.status {
        BroadcastStatus::Broadcast => println!("\n=== TRANSACTION SENT ==="),
        BroadcastStatus::Failed => println!("\n=== TRANSACTION NOT ACCEPTED ==="),
    }
    println!("TxHash: {}", outcome.tx_hash);
    println!("To:     {}", args.to);
    println!("Amount: {} ({} satoshis)", format_coins(amount), amount);
    println!("Fee:    {} satoshis", outcome.fee);
    println!("Inputs: {}", outcome.inputs);
    if outcome.change > 0 {
        println!("Change: {} ({} satoshis)", format_coins(outcome.change), outcome.change);
    }
    if !outcome.result.message.is_empty() {
        println!("Node:   {}", outcome.result.message);
    }

    if outcome.result.status == BroadcastStatus::Failed {
        bail!("Broadcast failed: {}", outcome.result.message);
    }
    Ok(())
}

async fn node_info(config: &ClientConfig) -> Result<()> {
    let client = node_client(config)?;
    let info = client.node_info().await.context("Node info query failed")?;

    println!("\n=== NODE ===");
    println!("Endpoint:     {}", client.base_url());
    println!("Status:       {}", info.status);
    println!("Tip height:   {}", info.tip_height);
    println!("Blocks:       {}", info.total_blocks);
    println!("Transactions: {}", info.total_transactions);
    if let Some(version) = info.version {
        println!("Version:      {version}");
    }
    Ok(())
}

async fn node_health(config: &ClientConfig) -> Result<()> {
    let client = node_client(config)?;
    let report = client.health().await.context("Health query failed")?;

    println!("\n=== HEALTH ===");
    println!("Healthy: {}", report.healthy);
    println!("Status:  {} (HTTP {})", report.status, report.http_status);
    for (name, service) in &report.services {
        match &service.error {
            Some(err) => println!("  {name}: {} ({err})", service.status),
            None => println!("  {name}: {}", service.status),
        }
    }
    if let Some(err) = &report.error {
        println!("Error:   {err}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a coin amount to satoshis.
fn parse_coins(amount: f64) -> Result<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be a positive number");
    }
    let satoshis = (amount * COIN as f64).round();
    if satoshis < 1.0 || satoshis >= u64::MAX as f64 {
        bail!("Amount out of range");
    }
    Ok(satoshis as u64)
}

fn format_coins(satoshis: u64) -> String {
    format!("{}.{:08} SHADOW", satoshis / COIN, satoshis % COIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_coins_converts_to_satoshis() {
        assert_eq!(parse_coins(6.0).unwrap(), 600_000_000);
        assert_eq!(parse_coins(0.001).unwrap(), 100_000);
        assert_eq!(parse_coins(0.00000001).unwrap(), 1);
    }

    #[test]
    fn parse_coins_rejects_bad_amounts() {
        assert!(parse_coins(0.0).is_err());
        assert!(parse_coins(-1.0).is_err());
        assert!(parse_coins(f64::NAN).is_err());
        assert!(parse_coins(0.000000001).is_err());
    }

    #[test]
    fn format_coins_pads_fraction() {
        assert_eq!(format_coins(399_900_000), "3.99900000 SHADOW");
        assert_eq!(format_coins(1), "0.00000001 SHADOW");
    }

    #[test]
    fn cli_parses_send() {
        let cli = Cli::try_parse_from([
            "shadowy-cli",
            "--node-url",
            "http://node:8080/api/v1",
            "send",
            "--wallet",
            "alice",
            "--to",
            "Sdest",
            "--amount",
            "1.5",
        ])
        .unwrap();
        assert_eq!(cli.global.node_url.as_deref(), Some("http://node:8080/api/v1"));
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.wallet, "alice");
                assert_eq!(args.fee, DEFAULT_FEE);
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn rekey_requires_confirmation() {
        let cli = Cli::try_parse_from(["shadowy-cli", "wallet", "rekey", "alice"]).unwrap();
        let Commands::Wallet {
            action: WalletAction::Rekey(args),
        } = cli.command
        else {
            panic!("expected wallet rekey");
        };
        assert!(!args.yes);

        let config = ClientConfig {
            wallet_dir: PathBuf::from("/nonexistent/shadowy-cli-test"),
            ..ClientConfig::default()
        };
        let err = wallet_rekey(&config, args).unwrap_err();
        assert!(err.to_string().contains("--yes"));
    }
}
