//! Client interface for interacting with the RegistryActor.
//!
//! The `RegistryHandle` provides a cheap-to-clone interface for sending
//! commands to the registry actor from connection tasks.
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Channel errors are mapped to `RegistryError::ChannelClosed` or a
//!   neutral default

use std::collections::BTreeMap;

use tokio::sync::{mpsc, oneshot};

use roster_core::{ConnectionId, Session};

use super::broadcast::OutboundSender;
use super::commands::{RegistryCommand, RegistryError};
use super::gateway::MoveOutcome;

/// Handle for interacting with the registry actor.
///
/// All methods are async and communicate with the actor via channels.
/// Replies arrive only after the actor has applied the command and issued
/// its roster broadcast.
#[derive(Clone)]
pub struct RegistryHandle {
    /// Command sender to the actor
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Create a new registry handle.
    pub fn new(sender: mpsc::Sender<RegistryCommand>) -> Self {
        Self { sender }
    }

    /// Registers a new connection and its outbound queue.
    ///
    /// # Errors
    ///
    /// - `RegistryError::SessionAlreadyExists` if the id is already live
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn connect(
        &self,
        connection_id: ConnectionId,
        role_hint: Option<String>,
        name_hint: Option<String>,
        outbound: OutboundSender,
    ) -> Result<Session, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::Connect {
                connection_id,
                role_hint,
                name_hint,
                outbound,
                respond_to: tx,
            })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)?
    }

    /// Reports the caller's current page.
    ///
    /// Returns `false` if the session was already gone or the actor has
    /// shut down.
    pub async fn page_update(&self, connection_id: ConnectionId, page: String) -> bool {
        let (tx, rx) = oneshot::channel();

        if self
            .sender
            .send(RegistryCommand::PageUpdate {
                connection_id,
                page,
                respond_to: tx,
            })
            .await
            .is_err()
        {
            return false;
        }

        rx.await.unwrap_or(false)
    }

    /// Asks the actor to relocate `target` on behalf of `requester`.
    ///
    /// # Errors
    ///
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn move_user(
        &self,
        requester: ConnectionId,
        target: ConnectionId,
        page: String,
    ) -> Result<MoveOutcome, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::MoveUser {
                requester,
                target,
                page,
                respond_to: tx,
            })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)
    }

    /// Signals that a connection closed.
    ///
    /// Fire-and-forget: does not wait for the actor.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        // Ignore send errors (actor may be shutting down)
        let _ = self
            .sender
            .send(RegistryCommand::Disconnect { connection_id })
            .await;
    }

    /// Current roster.
    ///
    /// Returns an empty map if communication with the actor fails.
    pub async fn snapshot(&self) -> BTreeMap<ConnectionId, Session> {
        let (tx, rx) = oneshot::channel();

        if self
            .sender
            .send(RegistryCommand::Snapshot { respond_to: tx })
            .await
            .is_err()
        {
            return BTreeMap::new();
        }

        rx.await.unwrap_or_default()
    }

    /// Check if the actor is still running.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}
