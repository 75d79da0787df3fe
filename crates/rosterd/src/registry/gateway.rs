//! Command gateway - applies client events to the session table.
//!
//! Every mutating operation ends with a roster broadcast issued from the
//! same call, so admins observe mutations in the order they were applied.
//!
//! Per-session lifecycle:
//!
//! ```text
//! CONNECTED ──▶ (PAGE_UPDATED)* ──▶ DISCONNECTED
//! ```
//!
//! `PAGE_UPDATED` is reached either by a self-report or by an admin
//! relocation, any number of times.

use tracing::{debug, info, warn};

use roster_core::{ConnectionId, Session};
use roster_protocol::ServerMessage;

use super::broadcast::{broadcast_roster, Outbox};
use super::commands::RegistryError;
use super::sessions::SessionRegistry;

/// Result of a relocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target relocated, navigated and roster broadcast.
    Moved,

    /// Requester is not an admin (or is gone). Silently dropped.
    Unauthorized,

    /// Target no longer exists. Silently dropped.
    UnknownTarget,
}

/// Owns the session table and the outbox; sole writer of both.
pub struct CommandGateway<O> {
    registry: SessionRegistry,
    outbox: O,
}

impl<O: Outbox> CommandGateway<O> {
    pub fn new(outbox: O) -> Self {
        Self {
            registry: SessionRegistry::new(),
            outbox,
        }
    }

    /// Read access to the session table.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut O {
        &mut self.outbox
    }

    /// Registers a new connection, then broadcasts.
    ///
    /// # Errors
    ///
    /// `RegistryError::SessionAlreadyExists` if the id is already live. Nothing
    /// is broadcast in that case.
    pub fn handle_connect(
        &mut self,
        connection_id: ConnectionId,
        role_hint: Option<&str>,
        name_hint: Option<&str>,
    ) -> Result<Session, RegistryError> {
        let session = match self.registry.create_session(connection_id, role_hint, name_hint) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Rejected connect");
                return Err(e);
            }
        };

        info!(
            connection_id = %session.connection_id,
            username = %session.username,
            role = %session.role,
            total_sessions = self.registry.len(),
            "Client connected"
        );

        // Role hints are not verified
        if session.is_admin() {
            warn!(
                connection_id = %session.connection_id,
                username = %session.username,
                "Admin role granted from unverified client hint"
            );
        }

        self.broadcast();
        Ok(session)
    }

    /// Self-report of the caller's own page. Any role may report.
    ///
    /// Returns `false` (and broadcasts nothing) if the caller is already gone.
    pub fn handle_page_update(&mut self, connection_id: &ConnectionId, page: &str) -> bool {
        if !self.registry.update_current_page(connection_id, page) {
            return false;
        }

        if let Some(session) = self.registry.get(connection_id) {
            info!(
                connection_id = %connection_id,
                username = %session.username,
                page = %page,
                "Page updated"
            );
        }

        self.broadcast();
        true
    }

    /// Admin relocation of another connection.
    ///
    /// Rejections are silent toward the requester: no error is returned to
    /// the transport and no frame is sent.
    pub fn handle_move_user(
        &mut self,
        requester: &ConnectionId,
        target: &ConnectionId,
        page: &str,
    ) -> MoveOutcome {
        let authorized = self
            .registry
            .get(requester)
            .is_some_and(Session::is_admin);

        if !authorized {
            warn!(
                requester = %requester,
                target = %target,
                "Non-admin tried to move a user"
            );
            return MoveOutcome::Unauthorized;
        }

        if !self.registry.update_current_page(target, page) {
            debug!(
                requester = %requester,
                target = %target,
                "Move target not connected, ignoring"
            );
            return MoveOutcome::UnknownTarget;
        }

        self.outbox.deliver(target, ServerMessage::navigate(page));
        self.broadcast();

        info!(requester = %requester, target = %target, page = %page, "Admin moved user");
        MoveOutcome::Moved
    }

    /// Removes the connection's session, then broadcasts.
    ///
    /// Idempotent; the broadcast is sent even if the session was already gone.
    pub fn handle_disconnect(&mut self, connection_id: &ConnectionId) -> Option<Session> {
        let removed = self.registry.remove_session(connection_id);

        info!(
            connection_id = %connection_id,
            was_registered = removed.is_some(),
            remaining_sessions = self.registry.len(),
            "Client disconnected"
        );

        self.broadcast();
        removed
    }

    fn broadcast(&mut self) {
        broadcast_roster(&self.registry, &mut self.outbox);
    }
}
