//! Roster fan-out to admin connections.
//!
//! Delivery is fire-and-forget: a message handed to the [`Outbox`] is
//! either queued on the connection's writer or dropped with a debug log.
//! There is no acknowledgement and no retry.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use roster_core::ConnectionId;
use roster_protocol::ServerMessage;

use super::sessions::SessionRegistry;

/// Sender half of a connection's outbound queue.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Delivery seam between the registry and the transport.
pub trait Outbox {
    /// Queues `message` for one connection. Must not block.
    fn deliver(&mut self, to: &ConnectionId, message: ServerMessage);
}

/// Outbox backed by one unbounded channel per connection.
#[derive(Debug, Default)]
pub struct ChannelOutbox {
    senders: HashMap<ConnectionId, OutboundSender>,
}

impl ChannelOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the outbound queue of a connection.
    pub fn attach(&mut self, connection_id: ConnectionId, sender: OutboundSender) {
        self.senders.insert(connection_id, sender);
    }

    /// Forgets a connection's outbound queue.
    pub fn detach(&mut self, connection_id: &ConnectionId) {
        self.senders.remove(connection_id);
    }

    pub fn is_attached(&self, connection_id: &ConnectionId) -> bool {
        self.senders.contains_key(connection_id)
    }
}

impl Outbox for ChannelOutbox {
    fn deliver(&mut self, to: &ConnectionId, message: ServerMessage) {
        match self.senders.get(to) {
            Some(sender) => {
                if sender.send(message).is_err() {
                    debug!(connection_id = %to, "Outbound queue closed, message dropped");
                }
            }
            None => {
                debug!(connection_id = %to, "No outbound queue for connection, message dropped");
            }
        }
    }
}

/// Pushes the full roster and the session count to every admin.
///
/// Called after every registry mutation, inside the same command, so each
/// admin sees pushes in mutation order.
pub fn broadcast_roster<O: Outbox + ?Sized>(registry: &SessionRegistry, outbox: &mut O) {
    let admins = registry.admin_connection_ids();
    if admins.is_empty() {
        return;
    }

    let users = registry.snapshot();
    let count = users.len();

    for admin in &admins {
        outbox.deliver(admin, ServerMessage::user_list(users.clone()));
        outbox.deliver(admin, ServerMessage::online_count(count));
    }

    debug!(admins = admins.len(), sessions = count, "Roster broadcast");
}

/// In-memory outbox for tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Default)]
    pub struct RecordingOutbox {
        pub sent: Vec<(ConnectionId, ServerMessage)>,
    }

    impl RecordingOutbox {
        /// Messages delivered to one connection, in order.
        pub fn to(&self, connection_id: &str) -> Vec<&ServerMessage> {
            self.sent
                .iter()
                .filter(|(to, _)| to.as_str() == connection_id)
                .map(|(_, msg)| msg)
                .collect()
        }

        pub fn navigations(&self) -> Vec<(&ConnectionId, &str)> {
            self.sent
                .iter()
                .filter_map(|(to, msg)| match msg {
                    ServerMessage::Navigate { page } => Some((to, page.as_str())),
                    _ => None,
                })
                .collect()
        }

        pub fn clear(&mut self) {
            self.sent.clear();
        }
    }

    impl Outbox for RecordingOutbox {
        fn deliver(&mut self, to: &ConnectionId, message: ServerMessage) {
            self.sent.push((to.clone(), message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingOutbox;
    use super::*;

    fn id(s: &str) -> ConnectionId {
        ConnectionId::new(s)
    }

    #[test]
    fn test_broadcast_reaches_only_admins() {
        let mut registry = SessionRegistry::new();
        registry.create_session(id("a1"), Some("admin"), None).unwrap();
        registry.create_session(id("u1"), None, None).unwrap();
        registry.create_session(id("a2"), Some("admin"), None).unwrap();

        let mut outbox = RecordingOutbox::default();
        broadcast_roster(&registry, &mut outbox);

        assert!(outbox.to("u1").is_empty());
        for admin in ["a1", "a2"] {
            let msgs = outbox.to(admin);
            assert_eq!(msgs.len(), 2);
            match msgs[0] {
                ServerMessage::UserList { users } => assert_eq!(users.len(), 3),
                other => panic!("Expected UserList, got {other:?}"),
            }
            assert_eq!(msgs[1], &ServerMessage::online_count(3));
        }
    }

    #[test]
    fn test_broadcast_without_admins_sends_nothing() {
        let mut registry = SessionRegistry::new();
        registry.create_session(id("u1"), None, None).unwrap();

        let mut outbox = RecordingOutbox::default();
        broadcast_roster(&registry, &mut outbox);

        assert!(outbox.sent.is_empty());
    }

    #[test]
    fn test_channel_outbox_delivers_to_attached_queue() {
        let mut outbox = ChannelOutbox::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        outbox.attach(id("c1"), tx);

        outbox.deliver(&id("c1"), ServerMessage::navigate("chat.html"));
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::navigate("chat.html"));
    }

    #[test]
    fn test_channel_outbox_drops_silently() {
        let mut outbox = ChannelOutbox::new();

        // Unknown connection
        outbox.deliver(&id("ghost"), ServerMessage::online_count(0));

        // Closed queue
        let (tx, rx) = mpsc::unbounded_channel();
        outbox.attach(id("c1"), tx);
        drop(rx);
        outbox.deliver(&id("c1"), ServerMessage::online_count(0));

        outbox.detach(&id("c1"));
        assert!(!outbox.is_attached(&id("c1")));
    }
}
