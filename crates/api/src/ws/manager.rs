use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use overlay_core::types::{Timestamp, UserId};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Which socket a connection was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Public overlay page; unauthenticated.
    Overlay,
    /// Dashboard editor; always has a user id.
    Editor,
}

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user, for editor connections.
    pub user_id: Option<UserId>,
    pub kind: ConnectionKind,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns both halves of its outbound channel: the sender for the
    /// connection's own frames, and the receiver the caller forwards to the
    /// WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: Option<UserId>,
        kind: ConnectionKind,
    ) -> (WsSender, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            kind,
            sender: tx.clone(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        (tx, rx)
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of active connections of one kind.
    pub async fn count_by_kind(&self, kind: ConnectionKind) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.kind == kind)
            .count()
    }

    /// Number of open editor sessions for `user_id`.
    pub async fn editor_sessions(&self, user_id: &str) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| {
                conn.kind == ConnectionKind::Editor && conn.user_id.as_deref() == Some(user_id)
            })
            .count()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
