//! Search aggregator service (rummage-search) - Main entry point
//!
//! Loads configuration, builds the source registry snapshot, and serves the
//! search API. SIGHUP (unix) and POST /config/reload both rebuild the
//! snapshot without a restart.

use anyhow::{Context, Result};
use clap::Parser;
use rummage_common::config::{resolve_config_path, AppConfig};
use rummage_search::api::server;
use rummage_search::state::{AppState, SearchContext};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rummage-search
#[derive(Parser, Debug)]
#[command(name = "rummage-search")]
#[command(about = "Concurrent multi-source search aggregator")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "RUMMAGE_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rummage_search=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), "RUMMAGE_CONFIG");
    let mut config = AppConfig::load_or_default(config_path.as_deref())
        .context("loading configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let context = SearchContext::build(config).context("building search context")?;
    let state = AppState::new(context, config_path);

    spawn_reload_listener(state.clone());

    info!("Starting rummage-search on {}", bind_addr);
    server::run(state, &bind_addr, shutdown_signal()).await?;
    info!("rummage-search stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
        return;
    }
    info!("shutdown signal received");
}

/// SIGHUP rebuilds the config snapshot in place (unix only).
#[cfg(unix)]
fn spawn_reload_listener(state: AppState) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                error!("failed to install SIGHUP handler: {}", e);
                return;
            }
        };
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading configuration");
            if let Err(e) = state.reload() {
                error!("config reload failed, keeping previous snapshot: {}", e);
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_listener(_state: AppState) {}
