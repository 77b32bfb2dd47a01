//! Muster Gateway - Container inventory HTTP gateway
//!
//! Serves a read-only view of the orchestrator's container inventory,
//! backed by a periodically refreshed in-memory cache.

mod api;

use anyhow::Result;
use api::AppState;
use clap::Parser;
use muster_common::{GatewayConfig, MetadataConfig};
use muster_inventory::{
    InstrumentedService, InstrumentedSource, InventoryCache, InventoryService, LoggingService,
    LoggingSource, ReadService,
};
use muster_upstream::{MetadataHttpClient, MetadataSource};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "muster-gateway")]
#[command(about = "Muster container inventory gateway")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/muster/gateway.toml")]
    config: String,

    /// Listen address for the HTTP API
    #[arg(short, long, env = "MUSTER_LISTEN")]
    listen: Option<String>,

    /// Base path the inventory API is served under
    #[arg(long, env = "MUSTER_BASE_PATH")]
    base_path: Option<String>,

    /// Metadata service endpoint
    #[arg(long, env = "MUSTER_METADATA_ENDPOINT")]
    metadata_endpoint: Option<String>,

    /// Seconds between refresh cycles
    #[arg(long, env = "MUSTER_REFRESH_INTERVAL")]
    refresh_interval_secs: Option<u64>,

    /// Seconds before an upstream fetch times out
    #[arg(long, env = "MUSTER_FETCH_TIMEOUT")]
    fetch_timeout_secs: Option<u64>,

    /// Log level
    #[arg(long, env = "MUSTER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load config file if it exists
    let config: GatewayConfig = if std::path::Path::new(&args.config).exists() {
        let config_str = std::fs::read_to_string(&args.config)?;
        toml::from_str(&config_str).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse config file: {}", e);
            GatewayConfig::default()
        })
    } else {
        GatewayConfig::default()
    };

    // Merge CLI args with config file (CLI takes precedence)
    let listen = args.listen.unwrap_or(config.server.listen);
    let base_path = args.base_path.unwrap_or(config.server.base_path);
    let metadata = MetadataConfig {
        endpoint: args.metadata_endpoint.unwrap_or(config.metadata.endpoint),
        refresh_interval_secs: args
            .refresh_interval_secs
            .unwrap_or(config.metadata.refresh_interval_secs),
        fetch_timeout_secs: args
            .fetch_timeout_secs
            .unwrap_or(config.metadata.fetch_timeout_secs),
    };
    let log_level = resolve_log_level(args.debug, args.log_level, config.logging.level);

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Muster Gateway");
    info!("Config file: {}", args.config);
    info!("Metadata endpoint: {}", metadata.base_url());
    info!(
        "Refresh interval: {}s, fetch timeout: {}s",
        metadata.refresh_interval_secs, metadata.fetch_timeout_secs
    );

    // Metadata source with logging and metrics layered over HTTP
    let client = MetadataHttpClient::new(&metadata)
        .map_err(|e| anyhow::anyhow!("Failed to create metadata client: {}", e))?;
    let source: Arc<dyn MetadataSource> =
        Arc::new(InstrumentedSource::new(LoggingSource::new(client)));

    // Cache and its recurring refresh
    let cache = Arc::new(InventoryCache::new(source));
    cache.start(Duration::from_secs(metadata.refresh_interval_secs));

    // Lookup service with logging and metrics over the read facade
    let service: Arc<dyn InventoryService> = Arc::new(InstrumentedService::new(
        LoggingService::new(ReadService::new(Arc::clone(&cache))),
    ));

    let state = Arc::new(AppState { service });
    let app = api::router(&base_path, state);

    // Parse listen address
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", listen, e))?;

    info!("Serving inventory API on {} under {}", addr, base_path);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache.shutdown();
    info!("Gateway shut down gracefully");

    Ok(())
}

/// Level precedence: --debug, then --log-level/env, then the config file
fn resolve_log_level(debug: bool, flag: Option<String>, file_level: String) -> String {
    if debug {
        "debug".to_string()
    } else {
        flag.unwrap_or(file_level)
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutting down...");
}
