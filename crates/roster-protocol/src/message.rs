//! Protocol message types for WebSocket communication.

use std::collections::BTreeMap;

use roster_core::{ConnectionId, Session};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum inbound frame size (1 MB)
pub const MAX_MESSAGE_SIZE: usize = 1_048_576;

/// Messages sent by clients to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Self-report of the page the client is displaying
    PageUpdate {
        /// Page identifier, e.g. "chat.html"
        page: String,
    },

    /// Admin request to relocate another connection
    MoveUser {
        /// Connection to relocate
        #[serde(rename = "socketId")]
        target: ConnectionId,
        /// Page to send it to
        page: String,
    },

    /// Ping to check connection
    Ping {
        /// Sequence number for matching pong response
        seq: u64,
    },
}

impl ClientMessage {
    /// Creates a page update message.
    pub fn page_update(page: impl Into<String>) -> Self {
        Self::PageUpdate { page: page.into() }
    }

    /// Creates a relocation request.
    pub fn move_user(target: ConnectionId, page: impl Into<String>) -> Self {
        Self::MoveUser {
            target,
            page: page.into(),
        }
    }

    /// Creates a ping message.
    pub fn ping(seq: u64) -> Self {
        Self::Ping { seq }
    }

    /// Parses one inbound text frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MessageTooLarge` if the frame exceeds [`MAX_MESSAGE_SIZE`]
    /// - `ProtocolError::Malformed` if the frame is not a known message
    pub fn parse(frame: &str) -> Result<Self, ProtocolError> {
        if frame.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: frame.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PageUpdate { .. } => "pageUpdate",
            Self::MoveUser { .. } => "moveUser",
            Self::Ping { .. } => "ping",
        }
    }
}

/// Messages sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Connection accepted; tells the client its own id
    Connected {
        /// Assigned connection id
        #[serde(rename = "connectionId")]
        connection_id: ConnectionId,
    },

    /// Instruction to display another page
    Navigate {
        /// Page to navigate to
        page: String,
    },

    /// Full roster, pushed to admins only
    UserList {
        /// Every live session keyed by connection id
        users: BTreeMap<ConnectionId, Session>,
    },

    /// Number of live sessions, pushed to admins only
    OnlineCount {
        /// Registry size at broadcast time
        count: usize,
    },

    /// Pong response to ping
    Pong {
        /// Sequence number from ping
        seq: u64,
    },

    /// Error response for malformed frames
    Error {
        /// Error message
        message: String,
    },
}

impl ServerMessage {
    /// Creates a connected response.
    pub fn connected(connection_id: ConnectionId) -> Self {
        Self::Connected { connection_id }
    }

    /// Creates a navigation instruction.
    pub fn navigate(page: impl Into<String>) -> Self {
        Self::Navigate { page: page.into() }
    }

    /// Creates a roster message.
    pub fn user_list(users: BTreeMap<ConnectionId, Session>) -> Self {
        Self::UserList { users }
    }

    /// Creates an online count message.
    pub fn online_count(count: usize) -> Self {
        Self::OnlineCount { count }
    }

    /// Creates a pong response.
    pub fn pong(seq: u64) -> Self {
        Self::Pong { seq }
    }

    /// Creates an error response.
    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
}

/// Errors that can occur while decoding inbound frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_names() {
        let json = serde_json::to_string(&ClientMessage::page_update("chat.html")).unwrap();
        assert!(json.contains("\"type\":\"pageUpdate\""));
        assert!(json.contains("\"page\":\"chat.html\""));

        let json =
            serde_json::to_string(&ClientMessage::move_user(ConnectionId::new("conn-3"), "a.html"))
                .unwrap();
        assert!(json.contains("\"type\":\"moveUser\""));
        assert!(json.contains("\"socketId\":\"conn-3\""));
    }

    #[test]
    fn test_parse_move_user_frame() {
        let msg =
            ClientMessage::parse(r#"{"type":"moveUser","socketId":"conn-9","page":"chat.html"}"#)
                .unwrap();

        match msg {
            ClientMessage::MoveUser { target, page } => {
                assert_eq!(target.as_str(), "conn-9");
                assert_eq!(page, "chat.html");
            }
            other => panic!("Expected MoveUser, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = ClientMessage::parse(r#"{"type":"deleteEverything"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));

        let err = ClientMessage::parse("not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_oversized_frame() {
        let frame = format!(
            r#"{{"type":"pageUpdate","page":"{}"}}"#,
            "x".repeat(MAX_MESSAGE_SIZE)
        );
        let err = ClientMessage::parse(&frame).unwrap_err();
        assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
        assert!(err.to_string().contains("max: 1048576"));
    }

    #[test]
    fn test_server_message_wire_names() {
        let json = serde_json::to_string(&ServerMessage::online_count(2)).unwrap();
        assert_eq!(json, r#"{"type":"onlineCount","count":2}"#);

        let json = serde_json::to_string(&ServerMessage::navigate("chat.html")).unwrap();
        assert_eq!(json, r#"{"type":"navigate","page":"chat.html"}"#);

        let json =
            serde_json::to_string(&ServerMessage::connected(ConnectionId::new("conn-1"))).unwrap();
        assert_eq!(json, r#"{"type":"connected","connectionId":"conn-1"}"#);
    }

    #[test]
    fn test_user_list_is_keyed_by_connection_id() {
        let session = Session::new(ConnectionId::new("conn-2"), None, Some("Bob"));
        let mut users = BTreeMap::new();
        users.insert(session.connection_id.clone(), session);

        let json = serde_json::to_value(ServerMessage::user_list(users)).unwrap();
        assert_eq!(json["type"], "userList");
        assert_eq!(json["users"]["conn-2"]["username"], "Bob");
        assert_eq!(json["users"]["conn-2"]["currentPage"], "index.html");
    }
}
