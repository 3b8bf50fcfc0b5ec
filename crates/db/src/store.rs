//! The [`RowStore`] seam and its PostgreSQL implementation.

use async_trait::async_trait;
use overlay_core::backoff::ReconnectConfig;
use overlay_core::change::SettingsChange;
use overlay_core::widget::WidgetType;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::listener::ChangeFeedListener;
use crate::models::user_profile::UserProfile;
use crate::models::widget_settings::WidgetSettingsRow;
use crate::repositories::{UserProfileRepo, WidgetSettingsRepo};
use crate::DbPool;

/// Broadcast capacity of the change feed.
pub const FEED_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// FeedEvent
// ---------------------------------------------------------------------------

/// One item on the row-store change feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A committed row snapshot.
    Change(SettingsChange),
    /// The feed lost its upstream connection; changes may be missed until
    /// [`FeedEvent::Reconnected`].
    Disconnected,
    /// The upstream connection is back.
    Reconnected,
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached (network, pool, TLS).
    #[error("Store unreachable: {0}")]
    Transport(String),

    /// The store answered and refused the operation.
    #[error("Store rejected the operation: {message}")]
    Rejected {
        message: String,
        cause: Option<String>,
    },

    /// A row came back in a shape that could not be decoded.
    #[error("Failed to decode row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Protocol(_) => StoreError::Transport(err.to_string()),
            sqlx::Error::Database(db_err) => StoreError::Rejected {
                message: db_err.message().to_string(),
                cause: db_err
                    .constraint()
                    .map(str::to_string)
                    .or_else(|| db_err.code().map(|c| c.into_owned())),
            },
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => StoreError::Decode(err.to_string()),
            other => StoreError::Rejected {
                message: other.to_string(),
                cause: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// Remote row storage for widget settings.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Deep-merge `partial` into the `(user_id, widget)` row, creating it if
    /// absent, and return the committed row. Atomic per row.
    async fn upsert_settings(
        &self,
        user_id: &str,
        widget: WidgetType,
        partial: &Value,
    ) -> Result<WidgetSettingsRow, StoreError>;

    async fn select_settings(
        &self,
        user_id: &str,
        widget: WidgetType,
    ) -> Result<Option<WidgetSettingsRow>, StoreError>;

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, StoreError>;

    /// Subscribe to committed changes. Every subscriber sees every event
    /// published after it subscribed.
    fn subscribe_changes(&self) -> broadcast::Receiver<FeedEvent>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// PgRowStore
// ---------------------------------------------------------------------------

/// [`RowStore`] over PostgreSQL.
///
/// The change feed is fed by a [`ChangeFeedListener`] started with
/// [`PgRowStore::spawn_change_feed`]; until then subscribers see nothing.
pub struct PgRowStore {
    pool: DbPool,
    feed: broadcast::Sender<FeedEvent>,
}

impl PgRowStore {
    pub fn new(pool: DbPool) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self { pool, feed }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Start the `LISTEN` task. It runs until `cancel` fires.
    pub fn spawn_change_feed(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let listener = ChangeFeedListener::new(
            self.pool.clone(),
            self.feed.clone(),
            ReconnectConfig::default(),
        );
        tokio::spawn(async move {
            tracing::info!("Starting settings change feed");
            listener.run(&cancel).await;
            tracing::info!("Settings change feed stopped");
        })
    }
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn upsert_settings(
        &self,
        user_id: &str,
        widget: WidgetType,
        partial: &Value,
    ) -> Result<WidgetSettingsRow, StoreError> {
        let row = WidgetSettingsRepo::upsert_merge(&self.pool, user_id, widget, partial).await?;
        Ok(row)
    }

    async fn select_settings(
        &self,
        user_id: &str,
        widget: WidgetType,
    ) -> Result<Option<WidgetSettingsRow>, StoreError> {
        Ok(WidgetSettingsRepo::find(&self.pool, user_id, widget).await?)
    }

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        Ok(UserProfileRepo::find_by_username(&self.pool, username).await?)
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<FeedEvent> {
        self.feed.subscribe()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
