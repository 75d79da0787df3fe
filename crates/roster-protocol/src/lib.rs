//! roster protocol - wire types for WebSocket clients
//!
//! This crate provides the JSON frames exchanged between browser
//! clients and the daemon, plus the connect-time query hints.

pub mod handshake;
pub mod message;

pub use handshake::ConnectParams;
pub use message::{ClientMessage, ProtocolError, ServerMessage, MAX_MESSAGE_SIZE};
