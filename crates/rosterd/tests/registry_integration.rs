//! Integration tests for the Registry Actor.
//!
//! These tests drive the registry through `spawn_registry()` and
//! `RegistryHandle`, with plain channels standing in for WebSocket
//! connections.
//!
//! Tests CAN use `.unwrap()` and `.expect()` - this is allowed.
//! We test the panic-free behavior of production code through assertions.

use roster_core::{ConnectionId, Role};
use roster_protocol::ServerMessage;
use rosterd::registry::{spawn_registry, MoveOutcome, RegistryError, RegistryHandle};
use tokio::sync::mpsc;

// ============================================================================
// Test Helpers
// ============================================================================

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

/// Connects `id` with the given hints and returns its inbox.
async fn connect(
    handle: &RegistryHandle,
    id: &str,
    role: Option<&str>,
    name: Option<&str>,
) -> Inbox {
    let (tx, rx) = mpsc::unbounded_channel();
    handle
        .connect(
            ConnectionId::new(id),
            role.map(str::to_string),
            name.map(str::to_string),
            tx,
        )
        .await
        .expect("connect should succeed");
    rx
}

/// Drains everything currently queued for a connection.
fn drain(inbox: &mut Inbox) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(msg) = inbox.try_recv() {
        messages.push(msg);
    }
    messages
}

fn online_counts(messages: &[ServerMessage]) -> Vec<usize> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::OnlineCount { count } => Some(*count),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_admin_and_user_roster_flow() {
    let handle = spawn_registry();

    // Admin joins: receives its own roster
    let mut admin = connect(&handle, "A", Some("admin"), Some("Root")).await;
    let first = drain(&mut admin);
    assert_eq!(first.len(), 2);
    match &first[0] {
        ServerMessage::UserList { users } => {
            assert_eq!(users.len(), 1);
            assert_eq!(users[&ConnectionId::new("A")].role, Role::Admin);
        }
        other => panic!("expected userList, got {other:?}"),
    }
    assert_eq!(first[1], ServerMessage::online_count(1));

    // User joins with no hints
    let mut user = connect(&handle, "U", None, None).await;
    let joined = drain(&mut admin);
    assert_eq!(online_counts(&joined), vec![2]);
    match &joined[0] {
        ServerMessage::UserList { users } => {
            let u = &users[&ConnectionId::new("U")];
            assert_eq!(u.username, "Guest");
            assert_eq!(u.role, Role::User);
            assert_eq!(u.current_page, "index.html");
        }
        other => panic!("expected userList, got {other:?}"),
    }
    // Users never see the roster
    assert!(drain(&mut user).is_empty());

    // User reports a page
    assert!(handle.page_update(ConnectionId::new("U"), "about.html".into()).await);
    let roster = handle.snapshot().await;
    assert_eq!(roster[&ConnectionId::new("U")].current_page, "about.html");
    assert_eq!(online_counts(&drain(&mut admin)), vec![2]);

    // Admin relocates the user
    let outcome = handle
        .move_user(
            ConnectionId::new("A"),
            ConnectionId::new("U"),
            "page2.html".into(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Moved);
    assert_eq!(drain(&mut user), vec![ServerMessage::navigate("page2.html")]);

    let moved = drain(&mut admin);
    match &moved[0] {
        ServerMessage::UserList { users } => {
            assert_eq!(users[&ConnectionId::new("U")].current_page, "page2.html");
        }
        other => panic!("expected userList, got {other:?}"),
    }

    // User leaves
    handle.disconnect(ConnectionId::new("U")).await;
    let roster = handle.snapshot().await;
    assert_eq!(roster.len(), 1);
    assert_eq!(online_counts(&drain(&mut admin)), vec![1]);
}

#[tokio::test]
async fn test_non_admin_move_is_ignored() {
    let handle = spawn_registry();
    let mut admin = connect(&handle, "A", Some("admin"), None).await;
    let mut u1 = connect(&handle, "U1", Some("user"), None).await;
    let mut u2 = connect(&handle, "U2", None, None).await;
    drain(&mut admin);

    let outcome = handle
        .move_user(
            ConnectionId::new("U1"),
            ConnectionId::new("U2"),
            "x.html".into(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Unauthorized);

    // No navigate, no broadcast, no state change
    assert!(drain(&mut u1).is_empty());
    assert!(drain(&mut u2).is_empty());
    assert!(drain(&mut admin).is_empty());
    let roster = handle.snapshot().await;
    assert_eq!(roster[&ConnectionId::new("U2")].current_page, "index.html");
}

#[tokio::test]
async fn test_move_unknown_target_is_noop() {
    let handle = spawn_registry();
    let mut admin = connect(&handle, "A", Some("admin"), None).await;
    drain(&mut admin);

    let outcome = handle
        .move_user(
            ConnectionId::new("A"),
            ConnectionId::new("ghost"),
            "x.html".into(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::UnknownTarget);
    assert!(drain(&mut admin).is_empty());
    assert_eq!(handle.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_stale_page_update_is_noop() {
    let handle = spawn_registry();
    let mut admin = connect(&handle, "A", Some("admin"), None).await;
    drain(&mut admin);

    assert!(!handle.page_update(ConnectionId::new("gone"), "x.html".into()).await);
    assert!(drain(&mut admin).is_empty());
    assert!(!handle
        .snapshot()
        .await
        .contains_key(&ConnectionId::new("gone")));
}

#[tokio::test]
async fn test_duplicate_connect_is_rejected() {
    let handle = spawn_registry();
    let _first = connect(&handle, "dup", None, None).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let err = handle
        .connect(ConnectionId::new("dup"), None, None, tx)
        .await
        .unwrap_err();
    assert_eq!(err, RegistryError::SessionAlreadyExists(ConnectionId::new("dup")));
    assert_eq!(handle.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_admin_disconnect_still_broadcasts() {
    let handle = spawn_registry();
    let mut a1 = connect(&handle, "A1", Some("admin"), None).await;
    let _a2 = connect(&handle, "A2", Some("admin"), None).await;
    drain(&mut a1);

    handle.disconnect(ConnectionId::new("A2")).await;
    handle.snapshot().await;
    assert_eq!(online_counts(&drain(&mut a1)), vec![1]);

    // Repeat disconnect leaves the count unchanged
    handle.disconnect(ConnectionId::new("A2")).await;
    handle.snapshot().await;
    assert_eq!(online_counts(&drain(&mut a1)), vec![1]);
}

#[tokio::test]
async fn test_many_connections_leave_no_sessions() {
    let handle = spawn_registry();

    let mut inboxes = Vec::new();
    for i in 0..50 {
        let role = if i % 10 == 0 { Some("admin") } else { None };
        inboxes.push(connect(&handle, &format!("conn-{i}"), role, None).await);
    }
    assert_eq!(handle.snapshot().await.len(), 50);

    for i in 0..50 {
        handle.disconnect(ConnectionId::new(format!("conn-{i}"))).await;
    }
    assert!(handle.snapshot().await.is_empty());
    assert!(handle.is_connected());
}
