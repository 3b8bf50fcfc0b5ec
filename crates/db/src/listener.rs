//! `LISTEN/NOTIFY` change feed for `widget_settings`.
//!
//! The `trg_widget_settings_notify` trigger publishes every committed row
//! on [`CHANNEL`]. [`ChangeFeedListener`] holds a dedicated connection,
//! forwards notifications as [`FeedEvent::Change`], and on connection loss
//! emits [`FeedEvent::Disconnected`], reconnects with exponential backoff,
//! then emits [`FeedEvent::Reconnected`]. Notifications sent while
//! disconnected are lost; consumers refetch on reconnect.

use overlay_core::backoff::{next_delay, ReconnectConfig};
use overlay_core::change::SettingsChange;
use overlay_core::types::{Timestamp, UserId, Version};
use overlay_core::widget::WidgetType;
use serde::Deserialize;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::repositories::WidgetSettingsRepo;
use crate::store::FeedEvent;
use crate::DbPool;

/// Notification channel written by the settings trigger.
pub const CHANNEL: &str = "widget_settings_changes";

/// Wire shape of a trigger notification.
///
/// `settings` is `null` when the row was too large for a NOTIFY payload.
#[derive(Debug, Deserialize)]
struct ChangeNotification {
    user_id: UserId,
    widget_type: WidgetType,
    settings: Option<serde_json::Value>,
    version: Version,
    updated_at: Timestamp,
}

/// Forwards trigger notifications onto the row-store change feed.
pub struct ChangeFeedListener {
    pool: DbPool,
    feed: broadcast::Sender<FeedEvent>,
    config: ReconnectConfig,
}

impl ChangeFeedListener {
    pub fn new(pool: DbPool, feed: broadcast::Sender<FeedEvent>, config: ReconnectConfig) -> Self {
        Self { pool, feed, config }
    }

    /// Listen until `cancel` fires, reconnecting as needed.
    pub async fn run(&self, cancel: &CancellationToken) {
        let mut connected_before = false;

        loop {
            let Some(mut listener) = self.connect_with_backoff(cancel).await else {
                return;
            };
            if connected_before {
                tracing::info!(channel = CHANNEL, "Change feed reconnected");
                let _ = self.feed.send(FeedEvent::Reconnected);
            }
            connected_before = true;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    result = listener.try_recv() => match result {
                        Ok(Some(notification)) => self.forward(notification.payload()).await,
                        Ok(None) => {
                            tracing::warn!(channel = CHANNEL, "Change feed connection lost");
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(channel = CHANNEL, error = %e, "Change feed receive failed");
                            break;
                        }
                    }
                }
            }

            let _ = self.feed.send(FeedEvent::Disconnected);
        }
    }

    // ---- private helpers ----

    async fn connect(&self) -> Result<PgListener, sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANNEL).await?;
        Ok(listener)
    }

    /// Connect, retrying with backoff. `None` means cancelled.
    async fn connect_with_backoff(&self, cancel: &CancellationToken) -> Option<PgListener> {
        let mut delay = self.config.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            tokio::select! {
                _ = cancel.cancelled() => return None,
                result = self.connect() => match result {
                    Ok(listener) => {
                        tracing::info!(channel = CHANNEL, attempt, "Listening for settings changes");
                        return Some(listener);
                    }
                    Err(e) => {
                        tracing::warn!(
                            channel = CHANNEL,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Change feed connect failed",
                        );
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            delay = next_delay(delay, &self.config);
        }
    }

    async fn forward(&self, payload: &str) {
        let notification = match decode_notification(payload) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed settings notification");
                return;
            }
        };

        let change = match notification.settings {
            Some(settings) => SettingsChange {
                user_id: notification.user_id,
                widget_type: notification.widget_type,
                settings,
                version: notification.version,
                updated_at: notification.updated_at,
            },
            None => match self.refetch(&notification.user_id, notification.widget_type).await {
                Some(change) => change,
                None => return,
            },
        };

        tracing::debug!(
            user_id = %change.user_id,
            widget = %change.widget_type,
            version = change.version,
            "Settings change",
        );
        let _ = self.feed.send(FeedEvent::Change(change));
    }

    /// Load the full row for a notification that omitted its document.
    async fn refetch(&self, user_id: &str, widget: WidgetType) -> Option<SettingsChange> {
        match WidgetSettingsRepo::find(&self.pool, user_id, widget).await {
            Ok(Some(row)) => Some(row.to_change()),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(user_id, widget = %widget, error = %e, "Failed to refetch settings row");
                None
            }
        }
    }
}

fn decode_notification(payload: &str) -> Result<ChangeNotification, serde_json::Error> {
    serde_json::from_str(payload)
}
