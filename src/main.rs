//! rustrid - HTTP server echoing request IDs
//!
//! Usage:
//!     rustrid [--config <path>]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use rustrid::config::{load_config, Config};
use rustrid::middleware::RequestIdLayer;
use rustrid::server::HttpServer;
use rustrid::util::{init_logging, ShutdownSignal};

/// HTTP server that tags every response with an X-Request-ID.
#[derive(Parser, Debug)]
#[command(name = "rustrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => load_config(path).with_context(|| {
            format!("failed to load configuration from '{}'", path.display())
        })?,
        None => Config::default(),
    };

    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }

    // Determine log level (CLI overrides config)
    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.global.log_level);

    init_logging(log_level, &config.global.log_format).context("failed to initialize logging")?;

    // Build the middleware up front so configuration errors surface before serving
    let layer = config
        .request_id
        .build_layer()
        .context("invalid request id configuration")?;

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Listen: {}", config.server.listen);
        println!("  Header: {}", layer.header());
        println!("  Strategy: {:?}", config.request_id.resolved_strategy());
        println!("  Generator: {:?}", config.request_id.generator);
        for path in &config.request_id.skip_paths {
            println!("    - skip {}", path);
        }
        return Ok(());
    }

    info!(
        listen = %config.server.listen,
        header = %layer.header(),
        strategy = ?config.request_id.resolved_strategy(),
        skip_paths = config.request_id.skip_paths.len(),
        "rustrid starting"
    );

    // Run the server
    run(config, layer)
}

/// Run the server with the given configuration.
fn run(config: Config, layer: RequestIdLayer) -> Result<()> {
    // Create tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config, layer).await })
}

/// Async entry point for the server.
async fn run_async(config: Config, layer: RequestIdLayer) -> Result<()> {
    let shutdown = ShutdownSignal::new();

    let server = HttpServer::bind(config.server.listen, layer)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;

    let handle = tokio::spawn(server.run(shutdown.subscribe()));

    info!("rustrid is running");
    info!("press Ctrl+C to stop");

    // Wait for shutdown signal, then stop the listener
    shutdown.shutdown_on_ctrl_c().await;
    let _ = handle.await;

    info!("rustrid shut down complete");
    Ok(())
}
