//! Topic registry and change-feed pump.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use overlay_core::topics::settings_topic;
use overlay_db::FeedEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelEvent, ChannelStatus};

/// Per-topic buffer. A listener that falls further behind observes a lag
/// and skips ahead.
const TOPIC_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// RealtimeHub
// ---------------------------------------------------------------------------

struct TopicEntry {
    sender: broadcast::Sender<ChannelEvent>,
    listeners: usize,
}

type TopicMap = Arc<Mutex<HashMap<String, TopicEntry>>>;

/// Multiplexes one broadcast channel per topic across all its listeners.
///
/// Shared as `Arc<RealtimeHub>`. A topic exists while it has at least one
/// [`Subscription`]; events for topics nobody listens to are dropped.
pub struct RealtimeHub {
    topics: TopicMap,
    status: Mutex<ChannelStatus>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            status: Mutex::new(ChannelStatus::Subscribed),
        }
    }

    /// Join `topic`, registering it if this is the first listener.
    pub fn subscribe(&self, topic: impl Into<String>) -> Subscription {
        let topic = topic.into();
        let receiver = {
            let mut topics = lock(&self.topics);
            let entry = topics.entry(topic.clone()).or_insert_with(|| {
                tracing::debug!(topic = %topic, "Registering topic");
                let (sender, _) = broadcast::channel(TOPIC_CAPACITY);
                TopicEntry {
                    sender,
                    listeners: 0,
                }
            });
            entry.listeners += 1;
            entry.sender.subscribe()
        };

        Subscription {
            topic,
            receiver,
            topics: Arc::clone(&self.topics),
            status: self.status(),
            active: true,
        }
    }

    /// Deliver `event` to every current listener of `topic`.
    ///
    /// Returns the number of listeners reached.
    pub fn publish(&self, topic: &str, event: ChannelEvent) -> usize {
        let topics = lock(&self.topics);
        topics
            .get(topic)
            .and_then(|entry| entry.sender.send(event).ok())
            .unwrap_or(0)
    }

    /// Current upstream status.
    pub fn status(&self) -> ChannelStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn topic_count(&self) -> usize {
        lock(&self.topics).len()
    }

    pub fn listener_count(&self, topic: &str) -> usize {
        lock(&self.topics).get(topic).map_or(0, |e| e.listeners)
    }

    /// Route the change feed onto topics until `cancel` fires or the feed
    /// closes.
    ///
    /// Changes go to `"{widget}-settings:{user_id}"`. Feed disconnects and
    /// reconnects are broadcast to every topic as status events.
    pub async fn run(&self, mut feed: broadcast::Receiver<FeedEvent>, cancel: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Realtime hub cancelled");
                    break;
                }
                event = feed.recv() => event,
            };

            match event {
                Ok(FeedEvent::Change(change)) => {
                    let topic = settings_topic(change.widget_type, &change.user_id);
                    let version = change.version;
                    let reached = self.publish(&topic, ChannelEvent::SettingsChanged(change));
                    tracing::debug!(topic = %topic, version, listeners = reached, "Routed settings change");
                }
                Ok(FeedEvent::Disconnected) => self.set_status(ChannelStatus::Connecting),
                Ok(FeedEvent::Reconnected) => self.set_status(ChannelStatus::Subscribed),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Realtime hub lagged behind the change feed");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Change feed closed, realtime hub shutting down");
                    break;
                }
            }
        }
    }

    // ---- private helpers ----

    fn set_status(&self, status: ChannelStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
        tracing::info!(status = ?status, "Realtime channel status changed");

        let topics = lock(&self.topics);
        for entry in topics.values() {
            let _ = entry.sender.send(ChannelEvent::Status(status));
        }
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(topics: &TopicMap) -> MutexGuard<'_, HashMap<String, TopicEntry>> {
    topics.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// One listener's membership in a topic.
///
/// Dropping it unsubscribes. [`unsubscribe`](Subscription::unsubscribe)
/// may be called any number of times.
pub struct Subscription {
    topic: String,
    receiver: broadcast::Receiver<ChannelEvent>,
    topics: TopicMap,
    status: ChannelStatus,
    active: bool,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Last status observed by this listener.
    pub fn status(&self) -> ChannelStatus {
        self.status
    }

    /// Wait for the next event. `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        while self.active {
            match self.receiver.recv().await {
                Ok(event) => {
                    if let ChannelEvent::Status(status) = event {
                        self.status = status;
                    }
                    return Some(event);
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(topic = %self.topic, skipped = n, "Subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
        None
    }

    /// Leave the topic. The topic is unregistered with its last listener.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.status = ChannelStatus::Closed;

        let mut topics = lock(&self.topics);
        let remove = match topics.get_mut(&self.topic) {
            Some(entry) => {
                entry.listeners = entry.listeners.saturating_sub(1);
                entry.listeners == 0
            }
            None => false,
        };
        if remove {
            topics.remove(&self.topic);
            tracing::debug!(topic = %self.topic, "Unregistered topic");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
