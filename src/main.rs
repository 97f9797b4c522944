//! Pixel configuration service entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pixel_config_service::api::{create_router, AppState, PIXEL_PATH};
use pixel_config_service::config::{Config, VERBOSE_LOG_FILTER};
use pixel_config_service::error::{Result, ServiceError};
use pixel_config_service::metrics;
use pixel_config_service::pixel::PixelStore;
use pixel_config_service::utils::shutdown_signal;

/// In-memory tracking pixel configuration service.
#[derive(Parser, Debug)]
#[command(name = "pixel-config-service")]
#[command(about = "Serves a single in-memory tracking pixel configuration over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the pixel endpoint (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Logging settings come from the environment, so load it before anything logs
    let loaded = Config::load();
    let filter = match &loaded {
        Ok(config) => config.log_filter(args.verbose),
        Err(_) if args.verbose => VERBOSE_LOG_FILTER,
        Err(_) => "info",
    };
    init_logging(filter);

    let config = load_config(loaded)?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve { port }) => cmd_serve(config, port.or(args.port)).await,
        None => cmd_serve(config, args.port).await,
    }
}

/// Install the global subscriber with the given filter directives.
fn init_logging(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Validate loaded configuration, reporting failures through the log.
fn load_config(loaded: std::result::Result<Config, envy::Error>) -> Result<Config> {
    let config = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        ServiceError::InvalidConfig(e)
    })?;

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PIXEL CONFIG SERVICE - CONFIGURATION CHECK");
    println!("======================================================================");

    println!("Configuration Summary:");
    println!(
        "  Default Pixel ID: {}{}",
        config.default_pixel_id(),
        if config.default_pixel_id.as_deref().is_some_and(|id| !id.is_empty()) {
            ""
        } else {
            " (built-in fallback)"
        }
    );
    println!("  Port: {}", config.port);
    println!("  Log Level: {}", config.rust_log);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Serve the pixel endpoint until a shutdown signal arrives.
async fn cmd_serve(mut config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Configuration loaded");

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    let metrics_handle = metrics::init_metrics()?;

    let store = PixelStore::from_config(&config);
    info!(pixel_id = %store.default_pixel_id(), "Pixel store initialized");

    let router = create_router(AppState::new(store, metrics_handle));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.map_err(ServiceError::from)?;
    info!("HTTP server listening on {} ({})", addr, PIXEL_PATH);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServiceError::from)?;

    info!("Server stopped");
    Ok(())
}
