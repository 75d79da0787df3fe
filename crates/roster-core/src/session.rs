//! Session domain entities and value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page every new session starts on.
pub const DEFAULT_PAGE: &str = "index.html";

/// Display name for a `user` session that supplied no name.
pub const DEFAULT_USER_NAME: &str = "Guest";

/// Display name for an `admin` session that supplied no name.
pub const DEFAULT_ADMIN_NAME: &str = "Admin";

// ============================================================================
// Type-Safe Identifiers
// ============================================================================

/// Opaque identifier for one live connection.
///
/// Assigned by the transport layer and stable for the lifetime of the
/// connection. Ordered so roster snapshots serialize deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Creates a new ConnectionId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the id for the `n`th accepted connection.
    pub fn from_sequence(n: u64) -> Self {
        Self(format!("conn-{n}"))
    }

    /// Returns the underlying string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ConnectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Role
// ============================================================================

/// Privilege level of a session, fixed at connection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular visitor. Can only report its own page.
    #[default]
    User,

    /// Receives roster broadcasts and may relocate other sessions.
    Admin,
}

impl Role {
    /// Resolves a client-supplied role hint.
    ///
    /// Only the exact string `"admin"` selects [`Role::Admin`]; anything else,
    /// including an absent hint, selects [`Role::User`]. The hint is not
    /// verified.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some("admin") => Self::Admin,
            _ => Self::User,
        }
    }

    /// Display name used when the client supplies none.
    #[must_use]
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::User => DEFAULT_USER_NAME,
            Self::Admin => DEFAULT_ADMIN_NAME,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Server-side record of one live connection.
///
/// Serialized with the field names browser clients already consume
/// (`socketId`, `currentPage`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identity of the owning connection.
    #[serde(rename = "socketId")]
    pub connection_id: ConnectionId,

    /// Display name.
    pub username: String,

    /// Immutable after construction.
    pub role: Role,

    /// Logical page the client is currently showing.
    pub current_page: String,
}

impl Session {
    /// Builds a session from connect-time hints.
    ///
    /// A missing or empty name falls back to the role's default name.
    pub fn new(connection_id: ConnectionId, role_hint: Option<&str>, name_hint: Option<&str>) -> Self {
        let role = Role::from_hint(role_hint);
        let username = match name_hint {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => role.default_name().to_string(),
        };

        Self {
            connection_id,
            username,
            role,
            current_page: DEFAULT_PAGE.to_string(),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Sets the page this session is displaying.
    pub fn set_current_page(&mut self, page: impl Into<String>) {
        self.current_page = page.into();
    }
}
