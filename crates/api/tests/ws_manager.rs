//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades.

use axum::extract::ws::Message;
use overlay_api::ws::{ConnectionKind, WsManager};

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_count() {
    let manager = WsManager::new();

    let _conn = manager
        .add("conn-1".to_string(), None, ConnectionKind::Overlay)
        .await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: counts are split by kind and editor sessions by user
// ---------------------------------------------------------------------------

#[tokio::test]
async fn counts_by_kind_and_user() {
    let manager = WsManager::new();

    let _o1 = manager
        .add("overlay-1".to_string(), None, ConnectionKind::Overlay)
        .await;
    let _o2 = manager
        .add("overlay-2".to_string(), None, ConnectionKind::Overlay)
        .await;
    let _e1 = manager
        .add("editor-1".to_string(), Some("alice".into()), ConnectionKind::Editor)
        .await;
    let _e2 = manager
        .add("editor-2".to_string(), Some("alice".into()), ConnectionKind::Editor)
        .await;
    let _e3 = manager
        .add("editor-3".to_string(), Some("bob".into()), ConnectionKind::Editor)
        .await;

    assert_eq!(manager.count_by_kind(ConnectionKind::Overlay).await, 2);
    assert_eq!(manager.count_by_kind(ConnectionKind::Editor).await, 3);
    assert_eq!(manager.editor_sessions("alice").await, 2);
    assert_eq!(manager.editor_sessions("bob").await, 1);
    assert_eq!(manager.editor_sessions("carol").await, 0);
}

// ---------------------------------------------------------------------------
// Test: the returned sender reaches the returned receiver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sender_reaches_receiver() {
    let manager = WsManager::new();

    let (tx, mut rx) = manager
        .add("conn-1".to_string(), None, ConnectionKind::Editor)
        .await;
    tx.send(Message::Text("hello".into())).unwrap();

    let msg = rx.recv().await.expect("rx should receive the frame");
    assert!(matches!(&msg, Message::Text(t) if *t == "hello"));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let (_, mut rx1) = manager
        .add("conn-1".to_string(), None, ConnectionKind::Overlay)
        .await;
    let (_, mut rx2) = manager
        .add("conn-2".to_string(), Some("alice".into()), ConnectionKind::Editor)
        .await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(
        matches!(msg1, Message::Close(None)),
        "Expected Close(None), got: {msg1:?}"
    );
    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(matches!(msg2, Message::Close(None)));

    // The manager held the last sender, so the channel is now closed.
    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}

// ---------------------------------------------------------------------------
// Test: ping_all() reaches every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_reaches_every_connection() {
    let manager = WsManager::new();

    let (_, mut rx1) = manager
        .add("conn-1".to_string(), None, ConnectionKind::Overlay)
        .await;
    let (_, rx2) = manager
        .add("conn-2".to_string(), None, ConnectionKind::Overlay)
        .await;
    drop(rx2);

    manager.ping_all().await;

    let msg = rx1.recv().await.expect("rx1 should receive Ping");
    assert!(matches!(msg, Message::Ping(_)));
}
