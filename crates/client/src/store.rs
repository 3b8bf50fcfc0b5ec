//! Per-widget settings store.
//!
//! A [`SettingsStore`] holds the authoritative local value for one widget
//! in a `watch` channel, so reads never block and every local subscriber
//! sees each change. Values entering the store are always reconciled, so
//! subscribers only ever observe complete, schema-valid settings.
//!
//! Mutation is optimistic: the merged value is published before the save
//! is attempted, and a failed save does not roll it back.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use overlay_core::change::SettingsChange;
use overlay_core::merge::merged;
use overlay_core::reconcile::reconcile_report;
use overlay_core::schema::{
    validate_settings, AlertsSettings, ChatSettings, GamepadSettings, LyricsSettings,
    SchemaError, StatsSettings, VisualizerSettings, WidgetSchema,
};
use overlay_core::types::Version;
use overlay_core::widget::WidgetType;
use serde_json::Value;
use tokio::sync::watch;

use crate::gateway::{GatewayError, Identity, SettingsReader, SettingsWriter, StoredSettings};
use crate::ClientConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Validation(#[from] SchemaError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The store was built without a writer.
    #[error("{0} store is read-only")]
    ReadOnly(WidgetType),
}

// ---------------------------------------------------------------------------
// SettingsStore
// ---------------------------------------------------------------------------

/// Where a public cold load gets its value.
#[derive(Debug, Clone)]
pub enum PublicSource<T> {
    /// Already resolved by the caller; no network.
    Settings(T),
    /// Full path: username -> user id -> row.
    Username(String),
    /// Username already resolved.
    UserId(String),
}

/// What a stored value is reconciled over.
#[derive(Debug, Clone, Copy)]
enum Base {
    Default,
    Current,
}

pub struct SettingsStore<T: WidgetSchema> {
    value: watch::Sender<T>,
    /// Version of the last row accepted; `None` until one arrives.
    version: Mutex<Option<Version>>,
    unsaved: AtomicBool,
    /// Sequence number of the latest local mutation.
    mutations: AtomicU64,
    reader: Arc<dyn SettingsReader>,
    writer: Option<Arc<dyn SettingsWriter>>,
    config: ClientConfig,
}

impl<T: WidgetSchema> SettingsStore<T> {
    /// A store that can read and write.
    pub fn new(
        reader: Arc<dyn SettingsReader>,
        writer: Arc<dyn SettingsWriter>,
        config: ClientConfig,
    ) -> Self {
        Self::build(reader, Some(writer), config)
    }

    /// A store for the public read path. [`mutate`](Self::mutate) fails.
    pub fn read_only(reader: Arc<dyn SettingsReader>, config: ClientConfig) -> Self {
        Self::build(reader, None, config)
    }

    fn build(
        reader: Arc<dyn SettingsReader>,
        writer: Option<Arc<dyn SettingsWriter>>,
        config: ClientConfig,
    ) -> Self {
        let (value, _) = watch::channel(T::default());
        Self {
            value,
            version: Mutex::new(None),
            unsaved: AtomicBool::new(false),
            mutations: AtomicU64::new(0),
            reader,
            writer,
            config,
        }
    }

    /// Current value. Never blocks on I/O.
    pub fn get_settings(&self) -> T {
        self.value.borrow().clone()
    }

    /// Subscribe to local changes.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    pub fn version(&self) -> Option<Version> {
        *self.version.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` after a failed save, until the next successful one.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved.load(Ordering::SeqCst)
    }

    /// Merge `partial` over the current value, publish it, then persist.
    ///
    /// The merged value is published before any await whenever it still
    /// deserializes as `T`, even if it fails validation. A validation
    /// failure is returned without saving. Neither a validation failure
    /// nor a save failure reverts the published value.
    ///
    /// Saves may complete out of order. A save that finishes after a newer
    /// mutation was published only records its version; it neither
    /// replaces the local value nor clears the unsaved flag.
    pub async fn mutate(&self, identity: &Identity, partial: &Value) -> Result<T, SettingsError> {
        let writer = self.writer.as_ref().ok_or(SettingsError::ReadOnly(T::WIDGET))?;

        let current = serde_json::to_value(self.get_settings()).unwrap_or_default();
        let candidate = merged(&current, partial);

        let validated = validate_settings::<T>(&candidate);
        let published = match &validated {
            Ok(value) => Some(value.clone()),
            Err(_) => serde_json::from_value::<T>(candidate).ok(),
        };
        let seq = match published {
            Some(value) => {
                let seq = self.mutations.fetch_add(1, Ordering::SeqCst) + 1;
                self.value.send_replace(value);
                seq
            }
            None => self.mutations.load(Ordering::SeqCst),
        };
        validated?;

        let saved = writer.save(identity, T::WIDGET, partial).await;
        let latest = self.mutations.load(Ordering::SeqCst) == seq;
        match saved {
            Ok(stored) if latest => {
                self.unsaved.store(false, Ordering::SeqCst);
                self.accept(&stored.settings, stored.version, Base::Current);
                Ok(self.get_settings())
            }
            Ok(stored) => {
                tracing::debug!(
                    widget = %T::WIDGET,
                    version = stored.version,
                    "Save superseded by a newer local change",
                );
                self.note_version(stored.version);
                Ok(self.get_settings())
            }
            Err(e) => {
                self.unsaved.store(true, Ordering::SeqCst);
                tracing::warn!(
                    widget = %T::WIDGET,
                    user_id = identity.user_id(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Settings save failed; local changes kept",
                );
                Err(e.into())
            }
        }
    }

    /// Cold load for the public read path. Never fails.
    ///
    /// Any resolution miss, transport failure, or timeout yields the
    /// canonical default on first load and keeps the current value after
    /// that. A stored row older than the held version is ignored.
    pub async fn load_public(&self, source: PublicSource<T>) -> T {
        self.load_public_within(source, self.config.cold_load_timeout)
            .await
    }

    /// [`load_public`](Self::load_public) with an explicit fetch budget.
    pub(crate) async fn load_public_within(&self, source: PublicSource<T>, budget: Duration) -> T {
        let user = match source {
            PublicSource::Settings(settings) => {
                self.value.send_replace(settings.clone());
                return settings;
            }
            PublicSource::Username(name) => Lookup::Username(name),
            PublicSource::UserId(id) => Lookup::UserId(id),
        };

        let fetched = tokio::time::timeout(budget, self.fetch_public(&user));
        match fetched.await {
            Ok(Ok(Some(stored))) => {
                self.accept(&stored.settings, stored.version, Base::Default);
            }
            Ok(Ok(None)) => {
                tracing::debug!(widget = %T::WIDGET, lookup = ?user, "No stored settings, using defaults");
                self.fall_back();
            }
            Ok(Err(e)) => {
                tracing::warn!(widget = %T::WIDGET, lookup = ?user, error = %e, "Public cold load failed");
                self.fall_back();
            }
            Err(_) => {
                tracing::warn!(
                    widget = %T::WIDGET,
                    lookup = ?user,
                    timeout_ms = budget.as_millis() as u64,
                    "Public cold load timed out",
                );
                self.fall_back();
            }
        }
        self.get_settings()
    }

    /// Authenticated cold load of the caller's own row.
    pub async fn load_for(&self, identity: &Identity) -> Result<T, SettingsError> {
        match self.reader.load(identity.user_id(), T::WIDGET).await? {
            Some(stored) => {
                self.accept(&stored.settings, stored.version, Base::Default);
            }
            None => self.fall_back(),
        }
        Ok(self.get_settings())
    }

    /// Accept a snapshot from the realtime channel.
    ///
    /// Reconciled over the current value. Returns `false` if the change is
    /// for another widget or older than the held version.
    pub fn apply_remote(&self, change: &SettingsChange) -> bool {
        if change.widget_type != T::WIDGET {
            return false;
        }
        self.accept(&change.settings, change.version, Base::Current)
    }

    // ---- private helpers ----

    async fn fetch_public(&self, lookup: &Lookup) -> Result<Option<StoredSettings>, GatewayError> {
        let user_id = match lookup {
            Lookup::UserId(id) => id.clone(),
            Lookup::Username(name) => match self.reader.resolve_username(name).await? {
                Some(id) => id,
                None => return Ok(None),
            },
        };
        self.reader.load(&user_id, T::WIDGET).await
    }

    fn accept(&self, stored: &Value, version: Version, base: Base) -> bool {
        let mut held = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        if held.is_some_and(|v| version < v) {
            tracing::debug!(widget = %T::WIDGET, version, held = ?*held, "Ignoring older settings");
            return false;
        }

        let base = match base {
            Base::Default => T::default(),
            Base::Current => self.get_settings(),
        };
        let report = reconcile_report(&base, stored);
        if !report.repaired.is_empty() {
            tracing::debug!(widget = %T::WIDGET, repaired = ?report.repaired, "Repaired stored settings");
        }

        *held = Some(version);
        self.value.send_replace(report.value);
        true
    }

    /// Raise the held version without touching the value.
    fn note_version(&self, version: Version) {
        let mut held = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        if held.map_or(true, |v| version > v) {
            *held = Some(version);
        }
    }

    /// Default on first load; otherwise keep what is held.
    fn fall_back(&self) {
        if self.version().is_none() {
            self.value.send_replace(T::default());
        }
    }
}

#[derive(Debug)]
enum Lookup {
    Username(String),
    UserId(String),
}

// ---------------------------------------------------------------------------
// Dynamic access
// ---------------------------------------------------------------------------

/// A [`SettingsStore`] addressed by runtime [`WidgetType`], over JSON.
#[async_trait]
pub trait DynSettingsStore: Send + Sync {
    fn widget(&self) -> WidgetType;

    fn settings_json(&self) -> Value;

    fn version(&self) -> Option<Version>;

    fn has_unsaved_changes(&self) -> bool;

    async fn mutate_json(&self, identity: &Identity, partial: &Value) -> Result<Value, SettingsError>;

    async fn load_for_json(&self, identity: &Identity) -> Result<Value, SettingsError>;

    /// Public cold load by user id. Never fails.
    async fn load_public_json(&self, user_id: &str) -> Value;

    fn apply_remote(&self, change: &SettingsChange) -> bool;
}

/// Build a single type-erased store for `widget`.
///
/// Without a writer the store is read-only.
pub fn dyn_store(
    widget: WidgetType,
    reader: Arc<dyn SettingsReader>,
    writer: Option<Arc<dyn SettingsWriter>>,
    config: ClientConfig,
) -> Arc<dyn DynSettingsStore> {
    fn build<T: WidgetSchema>(
        reader: Arc<dyn SettingsReader>,
        writer: Option<Arc<dyn SettingsWriter>>,
        config: ClientConfig,
    ) -> Arc<dyn DynSettingsStore> {
        Arc::new(SettingsStore::<T>::build(reader, writer, config))
    }

    match widget {
        WidgetType::Visualizer => build::<VisualizerSettings>(reader, writer, config),
        WidgetType::Lyrics => build::<LyricsSettings>(reader, writer, config),
        WidgetType::Gamepad => build::<GamepadSettings>(reader, writer, config),
        WidgetType::Chat => build::<ChatSettings>(reader, writer, config),
        WidgetType::Alerts => build::<AlertsSettings>(reader, writer, config),
        WidgetType::Stats => build::<StatsSettings>(reader, writer, config),
    }
}

#[async_trait]
impl<T: WidgetSchema> DynSettingsStore for SettingsStore<T> {
    fn widget(&self) -> WidgetType {
        T::WIDGET
    }

    fn settings_json(&self) -> Value {
        serde_json::to_value(self.get_settings()).unwrap_or_default()
    }

    fn version(&self) -> Option<Version> {
        SettingsStore::version(self)
    }

    fn has_unsaved_changes(&self) -> bool {
        SettingsStore::has_unsaved_changes(self)
    }

    async fn mutate_json(&self, identity: &Identity, partial: &Value) -> Result<Value, SettingsError> {
        let value = self.mutate(identity, partial).await?;
        Ok(serde_json::to_value(value).unwrap_or_default())
    }

    async fn load_for_json(&self, identity: &Identity) -> Result<Value, SettingsError> {
        let value = self.load_for(identity).await?;
        Ok(serde_json::to_value(value).unwrap_or_default())
    }

    async fn load_public_json(&self, user_id: &str) -> Value {
        let value = self
            .load_public(PublicSource::UserId(user_id.to_string()))
            .await;
        serde_json::to_value(value).unwrap_or_default()
    }

    fn apply_remote(&self, change: &SettingsChange) -> bool {
        SettingsStore::apply_remote(self, change)
    }
}

// ---------------------------------------------------------------------------
// StoreRegistry
// ---------------------------------------------------------------------------

/// One store per widget kind, built together and shared by `Arc`.
pub struct StoreRegistry {
    pub visualizer: Arc<SettingsStore<VisualizerSettings>>,
    pub lyrics: Arc<SettingsStore<LyricsSettings>>,
    pub gamepad: Arc<SettingsStore<GamepadSettings>>,
    pub chat: Arc<SettingsStore<ChatSettings>>,
    pub alerts: Arc<SettingsStore<AlertsSettings>>,
    pub stats: Arc<SettingsStore<StatsSettings>>,
}

impl StoreRegistry {
    pub fn new(
        reader: Arc<dyn SettingsReader>,
        writer: Arc<dyn SettingsWriter>,
        config: ClientConfig,
    ) -> Self {
        macro_rules! store {
            () => {
                Arc::new(SettingsStore::new(
                    Arc::clone(&reader),
                    Arc::clone(&writer),
                    config.clone(),
                ))
            };
        }
        Self {
            visualizer: store!(),
            lyrics: store!(),
            gamepad: store!(),
            chat: store!(),
            alerts: store!(),
            stats: store!(),
        }
    }

    /// The store for `widget`, type-erased.
    pub fn get(&self, widget: WidgetType) -> Arc<dyn DynSettingsStore> {
        match widget {
            WidgetType::Visualizer => self.visualizer.clone(),
            WidgetType::Lyrics => self.lyrics.clone(),
            WidgetType::Gamepad => self.gamepad.clone(),
            WidgetType::Chat => self.chat.clone(),
            WidgetType::Alerts => self.alerts.clone(),
            WidgetType::Stats => self.stats.clone(),
        }
    }

    /// Route a channel snapshot to its widget's store.
    pub fn apply_remote(&self, change: &SettingsChange) -> bool {
        self.get(change.widget_type).apply_remote(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::StoreGateway;
    use assert_matches::assert_matches;
    use overlay_db::{MemoryRowStore, RowStore, StoreError};
    use serde_json::json;

    fn setup() -> (Arc<MemoryRowStore>, SettingsStore<ChatSettings>) {
        let rows = Arc::new(MemoryRowStore::new());
        let gw = Arc::new(StoreGateway::new(rows.clone()));
        let store = SettingsStore::new(gw.clone(), gw, ClientConfig::default());
        (rows, store)
    }

    fn me() -> Identity {
        Identity::from_verified_subject("user_1")
    }

    /// Delays each save by the next queued duration before writing.
    struct SlowWriter {
        inner: Arc<StoreGateway>,
        delays: Mutex<std::collections::VecDeque<Duration>>,
    }

    impl SlowWriter {
        fn new(inner: Arc<StoreGateway>, delays: impl IntoIterator<Item = Duration>) -> Self {
            Self {
                inner,
                delays: Mutex::new(delays.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl SettingsWriter for SlowWriter {
        async fn save(
            &self,
            identity: &Identity,
            widget: WidgetType,
            partial: &Value,
        ) -> Result<StoredSettings, GatewayError> {
            let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.inner.save(identity, widget, partial).await
        }
    }

    fn slow_setup(
        delays: impl IntoIterator<Item = Duration>,
    ) -> (Arc<MemoryRowStore>, Arc<SettingsStore<ChatSettings>>) {
        let rows = Arc::new(MemoryRowStore::new());
        let gw = Arc::new(StoreGateway::new(rows.clone()));
        let writer = Arc::new(SlowWriter::new(gw.clone(), delays));
        let store = SettingsStore::new(gw, writer, ClientConfig::default());
        (rows, Arc::new(store))
    }

    async fn wait_for_font_size(store: &SettingsStore<ChatSettings>, size: i32) {
        while store.get_settings().display.font_size != size {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn mutate_publishes_before_save_completes() {
        let (_, store) = slow_setup([Duration::from_secs(5)]);
        let mut rx = store.watch();

        let pending = tokio::spawn({
            let store = Arc::clone(&store);
            async move {
                store
                    .mutate(&me(), &json!({"display": {"font_size": 30}}))
                    .await
            }
        });
        wait_for_font_size(&store, 30).await;

        assert!(!pending.is_finished());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().display.font_size, 30);
        assert_eq!(store.version(), None);

        let out = pending.await.unwrap().unwrap();
        assert_eq!(out.display.font_size, 30);
        assert_eq!(store.version(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_save_does_not_overwrite_newer_local_value() {
        let (rows, store) = slow_setup([Duration::from_secs(5), Duration::ZERO]);

        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move {
                store
                    .mutate(&me(), &json!({"display": {"font_size": 20}}))
                    .await
            }
        });
        wait_for_font_size(&store, 20).await;

        rows.fail_next_write(StoreError::Rejected {
            message: "nope".into(),
            cause: None,
        });
        let err = store
            .mutate(&me(), &json!({"display": {"font_size": 30}}))
            .await
            .unwrap_err();
        assert_matches!(err, SettingsError::Gateway(GatewayError::Persistence { .. }));

        let out = first.await.unwrap().unwrap();
        assert_eq!(out.display.font_size, 30);
        assert_eq!(store.get_settings().display.font_size, 30);
        assert!(store.has_unsaved_changes());
        assert_eq!(store.version(), Some(1));
    }

    #[tokio::test]
    async fn invalid_mutation_is_kept_locally_but_not_saved() {
        let (rows, store) = setup();

        let err = store
            .mutate(&me(), &json!({"display": {"font_size": 500}}))
            .await
            .unwrap_err();

        assert_matches!(err, SettingsError::Validation(e) => {
            assert_eq!(e.paths(), vec!["display.font_size"]);
        });
        assert_eq!(store.get_settings().display.font_size, 500);
        assert!(rows
            .select_settings("user_1", WidgetType::Chat)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unrepresentable_mutation_leaves_value_untouched() {
        let (_, store) = setup();
        let before = store.get_settings();

        let err = store
            .mutate(&me(), &json!({"display": {"font_size": "big"}}))
            .await
            .unwrap_err();

        assert_matches!(err, SettingsError::Validation(_));
        assert_eq!(store.get_settings(), before);
    }

    #[tokio::test]
    async fn failed_save_keeps_optimistic_value_and_flags_unsaved() {
        let (rows, store) = setup();
        rows.fail_next_write(StoreError::Rejected {
            message: "nope".into(),
            cause: None,
        });

        let err = store
            .mutate(&me(), &json!({"display": {"font_size": 40}}))
            .await
            .unwrap_err();
        assert_matches!(err, SettingsError::Gateway(GatewayError::Persistence { .. }));
        assert_eq!(store.get_settings().display.font_size, 40);
        assert!(store.has_unsaved_changes());

        store
            .mutate(&me(), &json!({"display": {"font_size": 41}}))
            .await
            .unwrap();
        assert!(!store.has_unsaved_changes());
    }

    #[tokio::test]
    async fn read_only_store_refuses_mutation() {
        let rows = Arc::new(MemoryRowStore::new());
        let store: SettingsStore<ChatSettings> =
            SettingsStore::read_only(Arc::new(StoreGateway::new(rows)), ClientConfig::default());
        assert_matches!(
            store.mutate(&me(), &json!({})).await,
            Err(SettingsError::ReadOnly(WidgetType::Chat))
        );
    }

    #[tokio::test]
    async fn load_public_accepts_direct_settings() {
        let (_, store) = setup();
        let mut settings = ChatSettings::default();
        settings.display.font_size = 33;
        let out = store.load_public(PublicSource::Settings(settings.clone())).await;
        assert_eq!(out, settings);
        assert_eq!(store.get_settings(), settings);
    }

    #[tokio::test]
    async fn load_public_reconciles_legacy_rows() {
        let (rows, store) = setup();
        rows.insert_profile("user_1", "streamer").await;
        rows.seed_settings(
            "user_1",
            WidgetType::Chat,
            json!({"display": {"font_size": "huge", "max_messages": 12}, "legacy": true}),
        )
        .await;

        let out = store
            .load_public(PublicSource::Username("streamer".into()))
            .await;
        assert_eq!(out.display.font_size, ChatSettings::default().display.font_size);
        assert_eq!(out.display.max_messages, 12);
    }

    #[tokio::test]
    async fn load_public_unknown_user_yields_defaults() {
        let (_, store) = setup();
        let out = store.load_public(PublicSource::Username("ghost".into())).await;
        assert_eq!(out, ChatSettings::default());
    }

    #[tokio::test]
    async fn load_public_unreachable_store_yields_defaults() {
        let (rows, store) = setup();
        rows.insert_profile("user_1", "streamer").await;
        rows.set_reachable(false);
        let out = store
            .load_public(PublicSource::Username("streamer".into()))
            .await;
        assert_eq!(out, ChatSettings::default());
    }

    #[tokio::test(start_paused = true)]
    async fn load_public_times_out_to_defaults() {
        let (rows, store) = setup();
        rows.insert_profile("user_1", "streamer").await;
        rows.seed_settings("user_1", WidgetType::Chat, json!({"display": {"font_size": 50}}))
            .await;
        rows.set_read_delay(Some(std::time::Duration::from_secs(10)));

        let out = store
            .load_public(PublicSource::Username("streamer".into()))
            .await;
        assert_eq!(out, ChatSettings::default());
    }

    #[tokio::test]
    async fn load_for_reads_the_callers_row() {
        let (rows, store) = setup();
        rows.seed_settings("user_1", WidgetType::Chat, json!({"display": {"font_size": 19}}))
            .await;
        let out = store.load_for(&me()).await.unwrap();
        assert_eq!(out.display.font_size, 19);
        assert_eq!(store.version(), Some(1));
    }

    #[tokio::test]
    async fn remote_changes_merge_over_current_and_respect_version() {
        let (_, store) = setup();
        store
            .mutate(&me(), &json!({"display": {"max_messages": 9}}))
            .await
            .unwrap();

        let newer = SettingsChange {
            user_id: "user_1".into(),
            widget_type: WidgetType::Chat,
            settings: json!({"display": {"font_size": 28}}),
            version: 5,
            updated_at: chrono::Utc::now(),
        };
        assert!(store.apply_remote(&newer));
        assert_eq!(store.get_settings().display.font_size, 28);
        assert_eq!(store.get_settings().display.max_messages, 9);

        let older = SettingsChange {
            version: 3,
            settings: json!({"display": {"font_size": 11}}),
            ..newer.clone()
        };
        assert!(!store.apply_remote(&older));
        assert_eq!(store.get_settings().display.font_size, 28);

        let other_widget = SettingsChange {
            widget_type: WidgetType::Stats,
            version: 9,
            ..newer
        };
        assert!(!store.apply_remote(&other_widget));
    }

    #[tokio::test]
    async fn dyn_store_without_writer_is_read_only() {
        let rows = Arc::new(MemoryRowStore::new());
        rows.seed_settings("user_1", WidgetType::Lyrics, json!({"display": {"max_lines": 4}}))
            .await;
        let store = dyn_store(
            WidgetType::Lyrics,
            Arc::new(StoreGateway::new(rows)),
            None,
            ClientConfig::default(),
        );

        let value = store.load_public_json("user_1").await;
        assert_eq!(value["display"]["max_lines"], 4);
        assert_matches!(
            store.mutate_json(&me(), &json!({})).await,
            Err(SettingsError::ReadOnly(WidgetType::Lyrics))
        );
    }

    #[tokio::test]
    async fn registry_routes_by_widget() {
        let rows = Arc::new(MemoryRowStore::new());
        let gw = Arc::new(StoreGateway::new(rows));
        let registry = StoreRegistry::new(gw.clone(), gw, ClientConfig::default());

        for widget in WidgetType::ALL {
            assert_eq!(registry.get(widget).widget(), widget);
        }

        let value = registry
            .get(WidgetType::Stats)
            .mutate_json(&me(), &json!({"behavior": {"refresh_interval_secs": 30}}))
            .await
            .unwrap();
        assert_eq!(value["behavior"]["refresh_interval_secs"], 30);
        assert_eq!(registry.stats.get_settings().behavior.refresh_interval_secs, 30);
    }
}
