//! Registry actor commands and errors.
//!
//! This module defines the message types for communicating with the `RegistryActor`:
//! - `RegistryCommand`: Commands sent to the actor
//! - `RegistryError`: Errors that can occur during registry operations

use std::collections::BTreeMap;

use roster_core::{ConnectionId, Session};
use thiserror::Error;
use tokio::sync::oneshot;

use super::broadcast::OutboundSender;
use super::gateway::MoveOutcome;

// ============================================================================
// Registry Commands
// ============================================================================

/// Commands sent to the registry actor.
///
/// Commands that need an answer carry a oneshot sender; the actor replies
/// after the mutation and its roster broadcast have both completed.
#[derive(Debug)]
pub enum RegistryCommand {
    /// A new connection opened.
    ///
    /// # Errors
    /// - `RegistryError::SessionAlreadyExists` if the id is already live
    Connect {
        /// Transport-assigned id
        connection_id: ConnectionId,
        /// Client-supplied role hint (unverified)
        role_hint: Option<String>,
        /// Client-supplied display name
        name_hint: Option<String>,
        /// Queue the actor delivers this connection's messages to
        outbound: OutboundSender,
        /// Channel to send the result
        respond_to: oneshot::Sender<Result<Session, RegistryError>>,
    },

    /// Self-reported page change.
    PageUpdate {
        connection_id: ConnectionId,
        page: String,
        /// Whether the session still existed
        respond_to: oneshot::Sender<bool>,
    },

    /// Admin relocation request.
    MoveUser {
        requester: ConnectionId,
        target: ConnectionId,
        page: String,
        respond_to: oneshot::Sender<MoveOutcome>,
    },

    /// A connection closed. Fire-and-forget.
    Disconnect { connection_id: ConnectionId },

    /// Current roster, ordered by connection id.
    Snapshot {
        respond_to: oneshot::Sender<BTreeMap<ConnectionId, Session>>,
    },
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A session with this connection id already exists.
    #[error("session already exists: {0}")]
    SessionAlreadyExists(ConnectionId),

    /// The actor is gone or dropped the response channel.
    #[error("response channel closed")]
    ChannelClosed,
}
