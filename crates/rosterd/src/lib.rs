//! Roster Daemon - presence and messaging relay
//!
//! This crate provides the core infrastructure for the roster daemon:
//! - `registry` - Session registry actor tracking live WebSocket connections
//! - `server` - HTTP + WebSocket server for browser clients
//! - `board` - File-backed message board
//! - `presence` - Heartbeat-based online counter
//! - `pages` - Listing of servable pages
//! - `config` - Layered daemon configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      rosterd daemon                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐   │
//! │  │     Server      │────▶│     RegistryActor           │   │
//! │  │ (HTTP + /ws)    │     │  (session state owner)      │   │
//! │  └────────┬────────┘     └──────────────┬──────────────┘   │
//! │           │                             │                   │
//! │           │ upgrades                    │ roster, navigate  │
//! │           ▼                             ▼                   │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐   │
//! │  │ConnectionHandler│◀────│   ChannelOutbox             │   │
//! │  │  (per client)   │     │   (per-connection queues)   │   │
//! │  └─────────────────┘     └─────────────────────────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully

pub mod board;
pub mod config;
pub mod pages;
pub mod presence;
pub mod registry;
pub mod server;
