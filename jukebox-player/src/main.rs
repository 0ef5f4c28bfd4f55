//! Jukebox Player - Main entry point
//!
//! Loads the bootstrap config, wires the session registry to the clock voice
//! backend, the yt-dlp resolver and the event chat surface, and serves the
//! HTTP control API until Ctrl+C / SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use jukebox_common::EventBus;
use jukebox_player::config::{Config, ConfigOverrides};
use jukebox_player::control::{EventChatSurface, ReactionHub};
use jukebox_player::playback::PlaybackServices;
use jukebox_player::resolve::{DisabledCatalog, YtDlpResolver};
use jukebox_player::session::SessionRegistry;
use jukebox_player::voice::ClockVoiceGateway;
use jukebox_player::Jukebox;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for jukebox-player
#[derive(Parser, Debug)]
#[command(name = "jukebox-player")]
#[command(about = "Per-session music playback orchestrator")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "JUKEBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "JUKEBOX_PORT")]
    port: Option<u16>,

    /// Log level (overrides the config file; RUST_LOG wins over both)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&ConfigOverrides {
        config_path: args.config,
        port: args.port,
        log_level: args.log_level,
    })
    .context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jukebox-player v{}", env!("CARGO_PKG_VERSION"));
    match &config.source {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using built-in defaults"),
    }

    let events = EventBus::new(config.toml.playback.event_capacity);
    let services = PlaybackServices {
        gateway: Arc::new(ClockVoiceGateway::new(config.toml.voice.time_scale)),
        chat: Arc::new(EventChatSurface::new(events.clone())),
        reactions: ReactionHub::default(),
        events,
        settings: config.controller_settings(),
    };

    let jukebox = Jukebox::new(
        SessionRegistry::new(services),
        Arc::new(YtDlpResolver::new(config.toml.resolver.clone())),
        Arc::new(DisabledCatalog),
        config.toml.resolver.concurrency,
    );

    let addr = config.bind_addr().context("Invalid bind address")?;
    jukebox_player::api::run(addr, jukebox, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
