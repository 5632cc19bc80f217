//! wg-exporter - WireGuard peer metrics for Prometheus

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use wg_exporter::{
    collector::WgCommand, config::ConfigManager, metrics::MetricsServer, Collector,
    ShutdownCoordinator,
};

/// CLI arguments for wg-exporter
#[derive(Parser, Debug)]
#[command(name = "wg-exporter")]
#[command(about = "Export WireGuard peer status as Prometheus metrics")]
#[command(version)]
#[command(long_about = "
Export WireGuard peer status as Prometheus metrics.

Runs `wg show` on every scrape and serves peer info, received bytes and
sent bytes per peer.

Configuration priority (highest to lowest):
1. Command-line arguments
2. Configuration file
3. Environment variables
4. Built-in defaults

Environment variables:
  WG_EXPORTER_BIND_ADDR        - Bind address (e.g., 0.0.0.0:9586)
  WG_EXPORTER_COMMAND          - Status command (e.g., \"sudo wg show\")
  WG_EXPORTER_COMMAND_TIMEOUT  - Status command timeout (e.g., 5s)
  WG_EXPORTER_LOG_LEVEL        - Log level (trace, debug, info, warn, error)
")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "wg-exporter.toml", help = "Path to configuration file")]
    pub config: PathBuf,

    /// Bind address (overrides config file)
    #[arg(short, long, help = "Bind address (e.g., 0.0.0.0:9586)")]
    pub bind: Option<String>,

    /// Port to bind to (overrides config file)
    #[arg(short, long, help = "Port to bind to")]
    pub port: Option<u16>,

    /// Status command timeout in seconds
    #[arg(long, help = "Status command timeout in seconds")]
    pub timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, help = "Log level")]
    pub log_level: Option<String>,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and exit")]
    pub validate_config: bool,

    /// Print a single scrape to stdout and exit
    #[arg(long, help = "Print a single scrape to stdout and exit")]
    pub once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let cli_log_level = if args.verbose {
        Some("debug")
    } else {
        args.log_level.as_deref()
    };

    // Initialize tracing before anything logs; the configured level is applied below
    let log_filter = init_tracing(cli_log_level.unwrap_or("info"));

    // Load configuration with priority: CLI args > config file > environment > defaults
    let mut config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        ConfigManager::load_from_env()?
    };

    config.merge_with_cli_args(args.bind.as_deref(), args.port, args.timeout, cli_log_level)?;

    config
        .validate()
        .context("Final configuration validation failed")?;

    if let Some(handle) = log_filter {
        handle
            .reload(EnvFilter::new(&config.logging.log_level))
            .context("Failed to apply configured log level")?;
    }

    info!("Starting wg-exporter v{}", env!("CARGO_PKG_VERSION"));

    if args.validate_config {
        info!("Configuration is valid");
        info!("  Bind address: {}", config.server.bind_addr);
        info!("  Metrics path: {}", config.server.metrics_path);
        info!("  Status command: {}", config.collector.command.join(" "));
        info!("  Command timeout: {:?}", config.collector.timeout);
        return Ok(());
    }

    let source = WgCommand::from_config(&config.collector)?;
    let collector = Arc::new(Collector::new(source));

    if args.once {
        let outcome = collector.scrape().await;
        let available = outcome.is_available();
        println!("{}", outcome.into_body());
        if !available {
            std::process::exit(1);
        }
        return Ok(());
    }

    let shutdown_coordinator = ShutdownCoordinator::new(config.server.shutdown_timeout);
    let server = MetricsServer::new(
        config.server.bind_addr,
        config.server.metrics_path.clone(),
        collector,
    );

    let mut server_handle = tokio::spawn(server.start(shutdown_coordinator.shutdown_signal()));

    tokio::select! {
        result = &mut server_handle => {
            // Server ended on its own, e.g. the address was already in use
            return match result {
                Ok(inner) => inner,
                Err(e) => Err(e).context("Metrics server task failed"),
            };
        }
        signal_result = shutdown_coordinator.listen_for_signals() => {
            if let Err(e) = signal_result {
                error!("Error setting up signal handlers: {}", e);
                shutdown_coordinator.trigger();
            }
        }
    }

    info!("Initiating graceful shutdown...");

    match tokio::time::timeout(shutdown_coordinator.timeout(), &mut server_handle).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) if !e.is_cancelled() => error!("Metrics server task failed: {}", e),
        Ok(Err(_)) => {}
        Err(_) => {
            warn!(
                "Shutdown timeout of {:?} reached, aborting metrics server",
                shutdown_coordinator.timeout()
            );
            server_handle.abort();
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
///
/// Returns a reload handle unless `RUST_LOG` fixed the filter.
fn init_tracing(log_level: &str) -> Option<reload::Handle<EnvFilter, Registry>> {
    let (env_filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(log_level), false),
    };
    let (env_filter, handle) = reload::Layer::new(env_filter);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .with_ansi(true),
        )
        .init();

    (!from_env).then_some(handle)
}
