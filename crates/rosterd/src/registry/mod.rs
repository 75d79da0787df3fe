//! Session registry using Actor pattern.
//!
//! The registry is the central state manager for all live connections.
//! It receives commands via a tokio mpsc channel, applies them to the
//! session table one at a time, and pushes the roster to every admin
//! after each mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │ WebSocket conns │────▶│  RegistryActor  │────▶│ per-conn outbound│
//! └─────────────────┘     └─────────────────┘     └──────────────────┘
//!         │                       │                        │
//!         │   RegistryCommand     │   CommandGateway       │ navigate,
//!         │   (mpsc channel)      │   SessionRegistry      │ userList,
//!         ▼                       ▼                        ▼ onlineCount
//!   connect / pageUpdate   HashMap<ConnectionId,     target or admins
//!   moveUser / disconnect  Session>
//! ```

use tokio::sync::mpsc;

mod actor;
mod broadcast;
mod commands;
mod gateway;
mod handle;
mod sessions;

pub use actor::RegistryActor;
pub use broadcast::{broadcast_roster, ChannelOutbox, OutboundSender, Outbox};
pub use commands::{RegistryCommand, RegistryError};
pub use gateway::{CommandGateway, MoveOutcome};
pub use handle::RegistryHandle;
pub use sessions::SessionRegistry;

/// Channel buffer size
const COMMAND_BUFFER: usize = 100;

/// Spawn the registry actor and return a handle for interaction.
///
/// # Example
///
/// ```no_run
/// use rosterd::registry::spawn_registry;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = spawn_registry();
///     let roster = handle.snapshot().await;
///     assert!(roster.is_empty());
/// }
/// ```
pub fn spawn_registry() -> RegistryHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);

    let actor = RegistryActor::new(cmd_rx);
    tokio::spawn(actor.run());

    RegistryHandle::new(cmd_tx)
}
