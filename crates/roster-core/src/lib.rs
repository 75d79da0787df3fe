//! roster core - shared domain types
//!
//! This crate provides the domain types shared between the daemon
//! (rosterd) and the wire protocol (roster-protocol).
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod board;
pub mod error;
pub mod session;

// Re-exports for convenience
pub use board::BoardMessage;
pub use error::{DomainError, DomainResult};
pub use session::{
    ConnectionId, Role, Session, DEFAULT_ADMIN_NAME, DEFAULT_PAGE, DEFAULT_USER_NAME,
};
