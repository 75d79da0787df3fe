//! HTTP + WebSocket server for the roster daemon.
//!
//! The server:
//! - Upgrades `GET /ws` to a WebSocket and spawns a ConnectionHandler per client
//! - Serves the message board, heartbeat and page-listing endpoints
//! - Falls back to static files from the public directory
//! - Supports graceful shutdown via CancellationToken
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Server      │
//! │  axum Router    │
//! └───────┬─────────┘
//!         │ /ws upgrade              /api/messages, /track-online,
//!         ▼                          /online-users, /pages
//! ┌─────────────────┐     ┌─────────────────┐
//! │ConnectionHandler│────▶│  RegistryHandle │
//! │   (per client)  │     │                 │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Per-connection errors are logged and end only that connection

mod connection;
mod http;

pub use connection::{ConnectionError, ConnectionHandler};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::board::MessageBoard;
use crate::config::Config;
use crate::presence::HeartbeatTracker;
use crate::registry::RegistryHandle;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the session registry
    pub registry: RegistryHandle,

    /// Message board store
    pub board: Arc<MessageBoard>,

    /// Heartbeat-based online counter
    pub heartbeats: Arc<HeartbeatTracker>,

    /// Directory with the servable pages
    pub public_dir: Arc<PathBuf>,

    /// Source of transport-assigned connection ids
    pub connection_counter: Arc<AtomicU64>,

    /// Ends open WebSocket connections on shutdown
    pub cancel_token: CancellationToken,
}

impl AppState {
    pub fn new(config: &Config, registry: RegistryHandle, cancel_token: CancellationToken) -> Self {
        Self {
            registry,
            board: Arc::new(MessageBoard::new(config.messages_file.clone())),
            heartbeats: Arc::new(HeartbeatTracker::new(config.active_window())),
            public_dir: Arc::new(config.public_dir.clone()),
            connection_counter: Arc::new(AtomicU64::new(0)),
            cancel_token,
        }
    }
}

/// Builds the router with all routes.
///
/// `/pages` is matched before the static fallback, so a `pages` file in the
/// public directory is never served.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.public_dir.as_path());

    Router::new()
        .route("/ws", get(connection::ws_handler))
        .route("/pages", get(http::pages))
        .route(
            "/api/messages",
            get(http::list_messages).post(http::post_message),
        )
        .route("/track-online", post(http::track_online))
        .route("/online-users", get(http::online_users))
        .fallback_service(static_files)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// HTTP + WebSocket server for the roster daemon.
pub struct Server {
    /// Resolved settings
    config: Config,

    /// Handle to the session registry
    registry: RegistryHandle,

    /// Cancellation token for graceful shutdown
    cancel_token: CancellationToken,
}

impl Server {
    /// Creates a new server.
    pub fn new(config: Config, registry: RegistryHandle, cancel_token: CancellationToken) -> Self {
        Self {
            config,
            registry,
            cancel_token,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Binds the configured address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.bind_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr,
                error: e.to_string(),
            })
    }

    /// Binds and serves until the cancellation token is triggered.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serves on an already-bound listener until cancelled.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        let state = AppState::new(&self.config, self.registry.clone(), self.cancel_token.clone());
        let app = router(state);

        info!(
            addr = %local_addr,
            public_dir = %self.config.public_dir.display(),
            messages_file = %self.config.messages_file.display(),
            "Server listening"
        );

        let shutdown = self.cancel_token.clone().cancelled_owned();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

        info!("Server stopped");
        Ok(())
    }
}

/// Errors that can occur in server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {error}")]
    Bind { addr: SocketAddr, error: String },

    #[error("Server error: {0}")]
    Serve(String),
}
