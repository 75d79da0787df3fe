//! The session table: connection id to session record.
//!
//! Pure data structure with no I/O. Owned by the command gateway, which is
//! the only writer.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use roster_core::{ConnectionId, Session};

use super::commands::RegistryError;

/// Authoritative table of live sessions.
///
/// Invariant: holds exactly one entry per open connection. Entries are
/// created on connect and deleted on disconnect; nothing else inserts or
/// removes.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and inserts the session for a new connection.
    ///
    /// # Errors
    ///
    /// `RegistryError::SessionAlreadyExists` if the id is already present.
    /// The transport never reuses ids, so this indicates a logic error.
    pub fn create_session(
        &mut self,
        connection_id: ConnectionId,
        role_hint: Option<&str>,
        name_hint: Option<&str>,
    ) -> Result<Session, RegistryError> {
        if self.sessions.contains_key(&connection_id) {
            return Err(RegistryError::SessionAlreadyExists(connection_id));
        }

        let session = Session::new(connection_id.clone(), role_hint, name_hint);
        self.sessions.insert(connection_id, session.clone());
        Ok(session)
    }

    /// Sets `current_page` on an existing session.
    ///
    /// Returns `false` without error if the session is gone (lost race with
    /// disconnect).
    pub fn update_current_page(&mut self, connection_id: &ConnectionId, page: &str) -> bool {
        match self.sessions.get_mut(connection_id) {
            Some(session) => {
                session.set_current_page(page);
                true
            }
            None => {
                debug!(connection_id = %connection_id, "Page update for removed session ignored");
                false
            }
        }
    }

    /// Deletes the entry if present. Idempotent.
    pub fn remove_session(&mut self, connection_id: &ConnectionId) -> Option<Session> {
        self.sessions.remove(connection_id)
    }

    /// Copy of the full table, ordered by connection id.
    pub fn snapshot(&self) -> BTreeMap<ConnectionId, Session> {
        self.sessions
            .iter()
            .map(|(id, session)| (id.clone(), session.clone()))
            .collect()
    }

    /// Ids of every admin session.
    pub fn admin_connection_ids(&self) -> BTreeSet<ConnectionId> {
        self.sessions
            .values()
            .filter(|session| session.is_admin())
            .map(|session| session.connection_id.clone())
            .collect()
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.sessions.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
