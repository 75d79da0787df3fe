//! Roster Daemon - presence and messaging relay
//!
//! Serves the static pages, the message board and heartbeat endpoints, and
//! the `/ws` WebSocket that keeps admins' live rosters current.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 0.0.0.0:4000, ./public, ./messages.json
//! rosterd
//!
//! # Custom port and page directory
//! PORT=8080 rosterd --public-dir ./site
//!
//! # Settings from a TOML file, flags still win
//! rosterd --config roster.toml --host 127.0.0.1
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rosterd::config::{Config, ConfigOverrides};
use rosterd::registry::spawn_registry;
use rosterd::server::Server;

/// roster daemon - real-time presence relay
#[derive(Parser, Debug)]
#[command(name = "rosterd", version, about)]
struct Args {
    /// TOML file with daemon settings
    #[arg(long, env = "ROSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "ROSTER_HOST")]
    host: Option<IpAddr>,

    /// Port to bind
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Directory with the servable pages
    #[arg(long, env = "ROSTER_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,

    /// JSON file backing the message board
    #[arg(long, env = "ROSTER_MESSAGES_FILE")]
    messages_file: Option<PathBuf>,

    /// Heartbeat window in milliseconds
    #[arg(long, env = "ROSTER_ACTIVE_WINDOW_MS")]
    active_window_ms: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host,
            port: self.port,
            public_dir: self.public_dir.clone(),
            messages_file: self.messages_file.clone(),
            active_window_ms: self.active_window_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("rosterd=info".parse()?)
                .add_directive("roster_core=info".parse()?)
                .add_directive("roster_protocol=info".parse()?),
        )
        .init();

    let config = Config::load(args.config.as_deref())
        .context("Failed to load configuration")?
        .apply(args.overrides());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        "roster daemon starting"
    );

    let cancel_token = CancellationToken::new();

    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    let registry = spawn_registry();
    info!("Session registry started");

    let server = Server::new(config, registry, cancel_token);

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("roster daemon stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
