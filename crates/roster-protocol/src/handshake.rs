//! Connect-time hints carried on the WebSocket upgrade request.

use roster_core::{ConnectionId, Session};
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /ws`, e.g. `/ws?role=admin&name=Alice`.
///
/// Both values are client-supplied and unverified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
    /// `"admin"` selects the admin role; anything else is a regular user
    #[serde(default)]
    pub role: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

impl ConnectParams {
    pub fn new(role: Option<&str>, name: Option<&str>) -> Self {
        Self {
            role: role.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    /// Builds the session these hints describe.
    pub fn to_session(&self, connection_id: ConnectionId) -> Session {
        Session::new(connection_id, self.role.as_deref(), self.name.as_deref())
    }
}
