//! Bursar - CENNZnet wallet service CLI.
//!
//! # Usage
//!
//! ```bash
//! # List the known networks
//! bursar chains
//!
//! # One-shot balance fetch
//! bursar balances --address 5GrwvaEF... --chain azalea
//!
//! # Poll balances every 10 seconds, export Prometheus metrics
//! bursar watch --address 5GrwvaEF... --metrics-port 9090
//!
//! # Sign and submit a transfer
//! SIGNER_SURI="//Alice" bursar transfer --to 5FHneW46... --asset cpay --amount 12.5
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bursar_chains::{MetadataCache, ReleaseClient, registry};
use bursar_core::metrics::init_metrics;
use bursar_core::models::{AssetKind, GenesisHash};
use bursar_core::ports::MemoryBalancesStore;
use bursar_core::services::{BalanceService, ConnectionCache, TransferService};
use bursar_substrate::SubstrateConnector;

/// Bursar CLI - CENNZnet wallet service.
#[derive(Parser, Debug)]
#[command(name = "bursar")]
#[command(about = "Bursar - wallet service for CENNZnet chains")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS", global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the known networks.
    Chains,

    /// Fetch current balances for an address.
    Balances {
        /// SS58 address to query.
        #[arg(long)]
        address: String,

        /// Network name or 0x-prefixed genesis hash.
        #[arg(long, env = "CHAIN", default_value = "azalea")]
        chain: String,
    },

    /// Poll balances for an address continuously.
    Watch {
        /// SS58 address to query.
        #[arg(long)]
        address: String,

        /// Network name or 0x-prefixed genesis hash.
        #[arg(long, env = "CHAIN", default_value = "azalea")]
        chain: String,

        /// Seconds between polls.
        #[arg(long, default_value = "10")]
        interval: u64,

        /// Prometheus metrics port (exporter disabled when unset).
        #[arg(long, env = "METRICS_PORT")]
        metrics_port: Option<u16>,
    },

    /// Sign and submit a transfer.
    Transfer {
        /// Signer secret URI (e.g. "//Alice" or a mnemonic).
        #[arg(long, env = "SIGNER_SURI", hide_env_values = true)]
        suri: String,

        /// SS58 address of the recipient.
        #[arg(long)]
        to: String,

        /// Which asset to send.
        #[arg(long, value_enum, default_value = "cennz")]
        asset: AssetArg,

        /// Amount in display units (e.g. "12.5").
        #[arg(long)]
        amount: String,

        /// Network name or 0x-prefixed genesis hash.
        #[arg(long, env = "CHAIN", default_value = "azalea")]
        chain: String,
    },

    /// Show the expanded metadata for a chain.
    Metadata {
        /// Network name or 0x-prefixed genesis hash.
        #[arg(long, env = "CHAIN", default_value = "azalea")]
        chain: String,

        /// Skip metadata blob decoding.
        #[arg(long)]
        partial: bool,

        /// Consult the release server for a newer definition.
        #[arg(long)]
        check_latest: bool,
    },
}

/// CLI-facing asset selector.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum AssetArg {
    Cennz,
    Cpay,
}

impl From<AssetArg> for AssetKind {
    fn from(arg: AssetArg) -> Self {
        match arg {
            AssetArg::Cennz => AssetKind::Cennz,
            AssetArg::Cpay => AssetKind::Cpay,
        }
    }
}

/// Wired-up service stack over the live Substrate connector.
struct Services {
    balances: BalanceService<SubstrateConnector, MemoryBalancesStore>,
    transfers: TransferService<SubstrateConnector>,
}

impl Services {
    fn new() -> Self {
        let connections = Arc::new(ConnectionCache::new(
            SubstrateConnector,
            registry::known_endpoints(),
        ));
        Self {
            balances: BalanceService::new(connections.clone(), Arc::new(MemoryBalancesStore::new())),
            transfers: TransferService::new(connections),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    match cli.command {
        Command::Chains => {
            list_chains();
            Ok(())
        }
        Command::Balances { address, chain } => fetch_balances(&address, &chain).await,
        Command::Watch {
            address,
            chain,
            interval,
            metrics_port,
        } => watch(&address, &chain, interval, metrics_port).await,
        Command::Transfer {
            suri,
            to,
            asset,
            amount,
            chain,
        } => transfer(&suri, &to, asset.into(), &amount, &chain).await,
        Command::Metadata {
            chain,
            partial,
            check_latest,
        } => show_metadata(&chain, partial, check_latest).await,
    }
}

/// Resolve a `--chain` argument: a network name or a genesis hash.
fn resolve_chain(chain: &str) -> Result<GenesisHash> {
    if let Some(endpoint) = registry::find_by_name(chain) {
        return Ok(endpoint.genesis_hash);
    }
    let genesis_hash = GenesisHash::from_hex(chain).map_err(|_| {
        anyhow::anyhow!("Unknown chain '{chain}' (expected a network name or a 0x genesis hash)")
    })?;
    if !registry::is_chain_supported(Some(&genesis_hash), false) {
        warn!("⚠️  {genesis_hash} is not a known network");
    }
    Ok(genesis_hash)
}

fn list_chains() {
    info!("🔗 Known networks:");
    for endpoint in registry::known_endpoints() {
        info!(
            "   {:<12} {}  {}",
            endpoint.name, endpoint.genesis_hash, endpoint.url
        );
    }
}

async fn fetch_balances(address: &str, chain: &str) -> Result<()> {
    let genesis_hash = resolve_chain(chain)?;
    let services = Services::new();

    let balances = services
        .balances
        .get_balances(address, &genesis_hash)
        .await
        .context("Failed to fetch balances")?;

    match balances {
        Some(balances) => {
            info!("💰 Balances for {address}");
            info!("   CENNZ: {}", balances.cennz);
            info!("   CPAY:  {}", balances.cpay);
            Ok(())
        }
        None => bail!("Chain {} is not in the endpoint registry", genesis_hash),
    }
}

async fn watch(
    address: &str,
    chain: &str,
    interval: u64,
    metrics_port: Option<u16>,
) -> Result<()> {
    let genesis_hash = resolve_chain(chain)?;
    let services = Services::new();

    // Prometheus metrics exporter (optional - failures don't crash the app)
    if let Some(port) = metrics_port {
        match format!("0.0.0.0:{port}").parse::<std::net::SocketAddr>() {
            Ok(metrics_addr) => match PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
            {
                Ok(()) => {
                    init_metrics();
                    info!("📊 Metrics: http://localhost:{port}/metrics");
                }
                Err(e) => {
                    warn!("⚠️  Failed to start metrics exporter: {e}. Continuing without metrics.");
                }
            },
            Err(e) => {
                warn!("⚠️  Invalid metrics address: {e}. Continuing without metrics.");
            }
        }
    }

    let stored = services.balances.stored_balances(address, &genesis_hash);
    info!(
        cennz = stored.cennz,
        cpay = stored.cpay,
        "Last stored snapshot"
    );

    info!("👀 Watching balances every {interval}s (Ctrl+C to stop)");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match services.balances.get_balances(address, &genesis_hash).await {
                    Ok(Some(balances)) => {
                        info!(cennz = balances.cennz, cpay = balances.cpay, "💰 Balances");
                    }
                    Ok(None) => bail!("Chain {} is not in the endpoint registry", genesis_hash),
                    Err(e) => warn!(error = %e, "⚠️  Balance fetch failed"),
                }
            }
            _ = shutdown_signal() => {
                info!("🛑 Stopped");
                return Ok(());
            }
        }
    }
}

async fn transfer(
    suri: &str,
    to: &str,
    asset: AssetKind,
    amount: &str,
    chain: &str,
) -> Result<()> {
    let genesis_hash = resolve_chain(chain)?;
    let services = Services::new();

    info!("💸 Sending {amount} {asset} to {to}");
    let receipt = services
        .transfers
        .transfer(suri, asset, to, amount, &genesis_hash)
        .await
        .context("Transfer failed")?;

    info!("✅ Transfer finalized");
    info!("   Block:     {}", receipt.block_hash);
    info!("   Extrinsic: {}", receipt.extrinsic_hash);
    Ok(())
}

async fn show_metadata(chain: &str, partial: bool, check_latest: bool) -> Result<()> {
    let genesis_hash = resolve_chain(chain)?;
    let cache = MetadataCache::bundled();

    let Some(mut definition) = cache
        .known_metadata()
        .into_iter()
        .find(|d| d.genesis_hash == genesis_hash.to_hex())
    else {
        bail!("No metadata definition for chain {}", genesis_hash);
    };

    if check_latest {
        let releases = ReleaseClient::new();
        match releases.latest_meta(&genesis_hash).await {
            Some(latest) if latest.spec_version > definition.spec_version => {
                info!(
                    spec_version = latest.spec_version,
                    "⬆️  Newer metadata release found, applying"
                );
                definition.spec_version = latest.spec_version;
                definition.meta_calls = Some(latest.meta_calls);
                if let Some(types) = releases.latest_types(&genesis_hash).await {
                    definition.types = Some(types.types);
                    definition.user_extensions = types.user_extensions;
                }
                cache.add_metadata(definition.clone());
            }
            Some(_) => info!("✅ Stored definition is up to date"),
            None => warn!("⚠️  No metadata release available for this chain"),
        }
    }

    let spec = cache
        .expand(&definition, partial)
        .context("Failed to expand metadata")?;

    info!("🔗 {}", spec.name);
    info!(
        "   Genesis:      {}",
        spec.genesis_hash
            .as_ref()
            .map(|h| h.to_hex())
            .unwrap_or_else(|| "unknown".into())
    );
    info!("   Spec version: {}", spec.spec_version);
    info!("   SS58 format:  {}", spec.ss58_format);
    info!(
        "   Token:        {} ({} decimals)",
        spec.token_symbol, spec.token_decimals
    );
    info!(
        "   Metadata:     {}",
        if spec.has_metadata { "decoded" } else { "not present" }
    );
    if let Some(metadata) = &spec.metadata {
        info!("   Pallets:      {}", metadata.pallets().count());
    }
    Ok(())
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
