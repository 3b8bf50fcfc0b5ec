//! In-process [`RowStore`].
//!
//! Same contract as [`PgRowStore`](crate::PgRowStore): merge-upserts are
//! atomic per row (a single write lock spans read, merge and write), every
//! committed row bumps `version` and is published on the change feed.
//! Used by the test suites and by `STORE_BACKEND=memory`.
//!
//! Test hooks simulate the failure modes of a remote store: a dropped
//! change feed, an unreachable store, injected write failures, and slow
//! reads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use overlay_core::merge::merge_json;
use overlay_core::types::UserId;
use overlay_core::widget::WidgetType;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::models::user_profile::UserProfile;
use crate::models::widget_settings::WidgetSettingsRow;
use crate::store::{FeedEvent, RowStore, StoreError, FEED_CAPACITY};

pub struct MemoryRowStore {
    rows: RwLock<HashMap<(UserId, WidgetType), WidgetSettingsRow>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
    feed: broadcast::Sender<FeedEvent>,
    feed_connected: AtomicBool,
    reachable: AtomicBool,
    injected_write_failure: Mutex<Option<StoreError>>,
    read_delay: Mutex<Option<Duration>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            rows: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            feed,
            feed_connected: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
            injected_write_failure: Mutex::new(None),
            read_delay: Mutex::new(None),
        }
    }

    /// Register a public profile.
    pub async fn insert_profile(&self, user_id: &str, username: &str) {
        let profile = UserProfile {
            user_id: user_id.to_string(),
            username: username.to_string(),
            display_name: None,
            created_at: Utc::now(),
        };
        self.profiles
            .write()
            .await
            .insert(username.to_string(), profile);
    }

    /// Store `settings` verbatim, bypassing the merge and the change feed.
    ///
    /// Lets tests plant legacy or malformed documents.
    pub async fn seed_settings(&self, user_id: &str, widget: WidgetType, settings: Value) {
        let key = (user_id.to_string(), widget);
        let mut rows = self.rows.write().await;
        let version = rows.get(&key).map_or(1, |r| r.version + 1);
        rows.insert(
            key,
            WidgetSettingsRow {
                user_id: user_id.to_string(),
                widget_type: widget,
                settings,
                version,
                updated_at: Utc::now(),
            },
        );
    }

    /// Drop the change feed. Writes still commit but are not published
    /// until [`simulate_reconnect`](Self::simulate_reconnect).
    pub fn simulate_disconnect(&self) {
        if self.feed_connected.swap(false, Ordering::SeqCst) {
            let _ = self.feed.send(FeedEvent::Disconnected);
        }
    }

    pub fn simulate_reconnect(&self) {
        if !self.feed_connected.swap(true, Ordering::SeqCst) {
            let _ = self.feed.send(FeedEvent::Reconnected);
        }
    }

    /// When unreachable, every operation fails with [`StoreError::Transport`].
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Fail the next upsert with `err`.
    pub fn fail_next_write(&self, err: StoreError) {
        if let Ok(mut slot) = self.injected_write_failure.lock() {
            *slot = Some(err);
        }
    }

    /// Delay every read by `delay`.
    pub fn set_read_delay(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.read_delay.lock() {
            *slot = delay;
        }
    }

    // ---- private helpers ----

    fn ensure_reachable(&self) -> Result<(), StoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Transport("memory store unreachable".to_string()))
        }
    }

    async fn apply_read_delay(&self) {
        let delay = self.read_delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn take_injected_failure(&self) -> Option<StoreError> {
        self.injected_write_failure
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
    }
}

impl Default for MemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn upsert_settings(
        &self,
        user_id: &str,
        widget: WidgetType,
        partial: &Value,
    ) -> Result<WidgetSettingsRow, StoreError> {
        self.ensure_reachable()?;
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }

        let key = (user_id.to_string(), widget);
        let row = {
            let mut rows = self.rows.write().await;
            match rows.get_mut(&key) {
                Some(existing) => {
                    merge_json(&mut existing.settings, partial);
                    existing.version += 1;
                    existing.updated_at = Utc::now();
                    existing.clone()
                }
                None => {
                    let row = WidgetSettingsRow {
                        user_id: user_id.to_string(),
                        widget_type: widget,
                        settings: partial.clone(),
                        version: 1,
                        updated_at: Utc::now(),
                    };
                    rows.insert(key, row.clone());
                    row
                }
            }
        };

        if self.feed_connected.load(Ordering::SeqCst) {
            let _ = self.feed.send(FeedEvent::Change(row.to_change()));
        }
        Ok(row)
    }

    async fn select_settings(
        &self,
        user_id: &str,
        widget: WidgetType,
    ) -> Result<Option<WidgetSettingsRow>, StoreError> {
        self.ensure_reachable()?;
        self.apply_read_delay().await;
        let rows = self.rows.read().await;
        Ok(rows.get(&(user_id.to_string(), widget)).cloned())
    }

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.ensure_reachable()?;
        self.apply_read_delay().await;
        Ok(self.profiles.read().await.get(username).cloned())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<FeedEvent> {
        self.feed.subscribe()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.ensure_reachable()
    }
}
