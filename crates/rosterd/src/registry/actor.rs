//! Registry actor - owns all session state and processes commands.
//!
//! The RegistryActor is the single owner of the session table and of every
//! connection's outbound queue. It receives commands via an mpsc channel
//! and handles them one at a time, so a mutation and the roster broadcast
//! it triggers are never interleaved with another event.
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Reply send failures are ignored (the caller went away)

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use roster_core::{ConnectionId, Session};

use super::broadcast::{ChannelOutbox, OutboundSender};
use super::commands::{RegistryCommand, RegistryError};
use super::gateway::{CommandGateway, MoveOutcome};

/// The registry actor.
///
/// Runs in a single task and processes commands sequentially. All state
/// mutations happen within this single task.
pub struct RegistryActor {
    /// Command receiver
    receiver: mpsc::Receiver<RegistryCommand>,

    /// Session table plus outbound queues
    gateway: CommandGateway<ChannelOutbox>,
}

impl RegistryActor {
    /// Creates a new registry actor.
    pub fn new(receiver: mpsc::Receiver<RegistryCommand>) -> Self {
        Self {
            receiver,
            gateway: CommandGateway::new(ChannelOutbox::new()),
        }
    }

    /// Runs the actor event loop.
    ///
    /// Processes commands until the channel closes (all handles dropped).
    pub async fn run(mut self) {
        info!("Registry actor starting");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!(
            sessions = self.gateway.registry().len(),
            "Registry actor stopped"
        );
    }

    /// Dispatches a command to the appropriate handler.
    fn handle_command(&mut self, cmd: RegistryCommand) {
        match cmd {
            RegistryCommand::Connect {
                connection_id,
                role_hint,
                name_hint,
                outbound,
                respond_to,
            } => {
                let result = self.handle_connect(connection_id, role_hint, name_hint, outbound);
                // Ignore send error - client may have dropped the receiver
                let _ = respond_to.send(result);
            }
            RegistryCommand::PageUpdate {
                connection_id,
                page,
                respond_to,
            } => {
                let updated = self.gateway.handle_page_update(&connection_id, &page);
                let _ = respond_to.send(updated);
            }
            RegistryCommand::MoveUser {
                requester,
                target,
                page,
                respond_to,
            } => {
                let outcome: MoveOutcome = self.gateway.handle_move_user(&requester, &target, &page);
                let _ = respond_to.send(outcome);
            }
            RegistryCommand::Disconnect { connection_id } => {
                self.handle_disconnect(&connection_id);
            }
            RegistryCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.handle_snapshot());
            }
        }
    }

    // ========================================================================
    // Command Handlers
    // ========================================================================

    fn handle_connect(
        &mut self,
        connection_id: ConnectionId,
        role_hint: Option<String>,
        name_hint: Option<String>,
        outbound: OutboundSender,
    ) -> Result<Session, RegistryError> {
        if self.gateway.registry().contains(&connection_id) {
            // Keep the live connection's queue; reject the newcomer
            return Err(RegistryError::SessionAlreadyExists(connection_id));
        }

        // Attach first so a new admin receives the broadcast its own connect triggers
        self.gateway
            .outbox_mut()
            .attach(connection_id.clone(), outbound);

        self.gateway
            .handle_connect(connection_id, role_hint.as_deref(), name_hint.as_deref())
    }

    fn handle_disconnect(&mut self, connection_id: &ConnectionId) {
        self.gateway.outbox_mut().detach(connection_id);
        if self.gateway.handle_disconnect(connection_id).is_none() {
            debug!(connection_id = %connection_id, "Disconnect for unknown connection");
        }
    }

    fn handle_snapshot(&self) -> BTreeMap<ConnectionId, Session> {
        self.gateway.registry().snapshot()
    }
}
