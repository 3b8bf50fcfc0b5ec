//! Public overlay lifecycle.
//!
//! ```text
//! Resolving(username) -> Loading(user_id) -> Live <-> Stale
//!          \-> NotFound
//! ```
//!
//! The username is resolved once per mount. The topic is joined before the
//! cold load so no change committed in between is missed. While the channel
//! reports `connecting` the overlay is `Stale` and keeps rendering its last
//! settings; on `subscribed` it refetches to recover anything missed and
//! returns to `Live`.

use std::sync::Arc;

use overlay_core::backoff::{next_delay, ReconnectConfig};
use overlay_core::schema::WidgetSchema;
use overlay_core::topics::settings_topic;
use overlay_core::types::{UserId, Version};
use overlay_events::{ChannelEvent, ChannelStatus, RealtimeHub, Subscription};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::gateway::{GatewayError, SettingsReader};
use crate::store::{PublicSource, SettingsStore};
use crate::ClientConfig;

/// What the overlay is currently rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState<T> {
    Resolving {
        username: String,
    },
    Loading {
        user_id: UserId,
    },
    Live {
        user_id: UserId,
        settings: T,
        version: Option<Version>,
    },
    /// Transport is down; `settings` is the last value received.
    Stale {
        user_id: UserId,
        settings: T,
        version: Option<Version>,
    },
    /// Terminal: the username does not resolve.
    NotFound {
        username: String,
    },
}

impl<T> OverlayState<T> {
    /// Settings to render, if any.
    pub fn settings(&self) -> Option<&T> {
        match self {
            OverlayState::Live { settings, .. } | OverlayState::Stale { settings, .. } => {
                Some(settings)
            }
            _ => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, OverlayState::Live { .. })
    }
}

/// One mounted public overlay for widget `T`.
pub struct PublicOverlay<T: WidgetSchema> {
    state: watch::Sender<OverlayState<T>>,
    store: SettingsStore<T>,
    subscription: Option<Subscription>,
    mounted: bool,
}

impl<T: WidgetSchema> PublicOverlay<T> {
    /// Resolve `username`, join its topic and cold-load.
    ///
    /// Never fails: an unknown username ends in [`OverlayState::NotFound`]
    /// and an unreachable store ends in `Live` with defaults. Lookup and
    /// cold load share one `cold_load_timeout` budget; a lookup that
    /// outlives it ends in `NotFound`.
    pub async fn mount(
        username: &str,
        reader: Arc<dyn SettingsReader>,
        hub: &RealtimeHub,
        config: ClientConfig,
    ) -> Self {
        let (state, _) = watch::channel(OverlayState::Resolving {
            username: username.to_string(),
        });
        let mut overlay = Self {
            state,
            store: SettingsStore::read_only(Arc::clone(&reader), config.clone()),
            subscription: None,
            mounted: true,
        };

        let deadline = Instant::now() + config.cold_load_timeout;
        let lookup = resolve(reader.as_ref(), username, config.resolve_attempts);
        let user_id = match tokio::time::timeout_at(deadline, lookup).await {
            Ok(Ok(Some(user_id))) => user_id,
            Ok(Ok(None)) => {
                tracing::info!(username, widget = %T::WIDGET, "Overlay username not found");
                overlay.publish(OverlayState::NotFound {
                    username: username.to_string(),
                });
                return overlay;
            }
            Ok(Err(e)) => {
                tracing::warn!(username, widget = %T::WIDGET, error = %e, "Overlay username lookup failed");
                overlay.publish(OverlayState::NotFound {
                    username: username.to_string(),
                });
                return overlay;
            }
            Err(_) => {
                tracing::warn!(
                    username,
                    widget = %T::WIDGET,
                    timeout_ms = config.cold_load_timeout.as_millis() as u64,
                    "Overlay username lookup timed out",
                );
                overlay.publish(OverlayState::NotFound {
                    username: username.to_string(),
                });
                return overlay;
            }
        };

        overlay.publish(OverlayState::Loading {
            user_id: user_id.clone(),
        });

        let subscription = hub.subscribe(settings_topic(T::WIDGET, &user_id));
        let connected = subscription.status() != ChannelStatus::Connecting;
        overlay.subscription = Some(subscription);

        let budget = deadline.saturating_duration_since(Instant::now());
        overlay
            .store
            .load_public_within(PublicSource::UserId(user_id.clone()), budget)
            .await;

        tracing::debug!(user_id = %user_id, widget = %T::WIDGET, "Overlay mounted");
        let next = overlay.rendered(user_id, connected);
        overlay.publish(next);
        overlay
    }

    pub fn state(&self) -> OverlayState<T> {
        self.state.borrow().clone()
    }

    /// Render signal: changes on every state transition.
    pub fn watch(&self) -> watch::Receiver<OverlayState<T>> {
        self.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Wait for the next channel event and apply it.
    ///
    /// Returns the new state, or `None` once unmounted or when the overlay
    /// has no topic (`NotFound`).
    pub async fn next_event(&mut self) -> Option<OverlayState<T>> {
        let event = self.subscription.as_mut()?.recv().await?;
        if !self.mounted {
            return None;
        }
        let user_id = self.user_id()?;

        let next = match event {
            ChannelEvent::SettingsChanged(change) => {
                if !self.store.apply_remote(&change) {
                    return Some(self.state());
                }
                let connected = !matches!(self.state(), OverlayState::Stale { .. });
                self.rendered(user_id, connected)
            }
            ChannelEvent::Status(ChannelStatus::Connecting) => {
                tracing::info!(user_id = %user_id, widget = %T::WIDGET, "Overlay channel dropped, rendering stale");
                self.rendered(user_id, false)
            }
            ChannelEvent::Status(ChannelStatus::Subscribed) => {
                let was_stale = matches!(self.state(), OverlayState::Stale { .. });
                if was_stale {
                    self.store
                        .load_public(PublicSource::UserId(user_id.clone()))
                        .await;
                    tracing::info!(user_id = %user_id, widget = %T::WIDGET, "Overlay channel restored");
                }
                self.rendered(user_id, true)
            }
            ChannelEvent::Status(ChannelStatus::Closed) => return Some(self.state()),
        };

        self.publish(next.clone());
        Some(next)
    }

    /// Apply events until unmounted or the channel closes.
    pub async fn run(&mut self) {
        while self.next_event().await.is_some() {}
    }

    /// Leave the topic. No state is published afterwards. Idempotent.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    // ---- private helpers ----

    fn user_id(&self) -> Option<UserId> {
        match &*self.state.borrow() {
            OverlayState::Loading { user_id }
            | OverlayState::Live { user_id, .. }
            | OverlayState::Stale { user_id, .. } => Some(user_id.clone()),
            _ => None,
        }
    }

    fn rendered(&self, user_id: UserId, connected: bool) -> OverlayState<T> {
        let settings = self.store.get_settings();
        let version = self.store.version();
        if connected {
            OverlayState::Live {
                user_id,
                settings,
                version,
            }
        } else {
            OverlayState::Stale {
                user_id,
                settings,
                version,
            }
        }
    }

    fn publish(&self, state: OverlayState<T>) {
        if self.mounted {
            self.state.send_replace(state);
        }
    }
}

impl<T: WidgetSchema> Drop for PublicOverlay<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Resolve a username, retrying transport failures with backoff.
async fn resolve(
    reader: &dyn SettingsReader,
    username: &str,
    attempts: u32,
) -> Result<Option<UserId>, GatewayError> {
    let config = ReconnectConfig::default();
    let mut delay = config.initial_delay;
    let mut attempt = 1u32;

    loop {
        match reader.resolve_username(username).await {
            Err(e) if e.is_retryable() && attempt < attempts => {
                tracing::debug!(username, attempt, error = %e, "Retrying username lookup");
                tokio::time::sleep(delay).await;
                delay = next_delay(delay, &config);
                attempt += 1;
            }
            result => return result,
        }
    }
}
