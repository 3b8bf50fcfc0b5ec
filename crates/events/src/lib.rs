//! Realtime channel: topic-addressed fan-out of settings changes.
//!
//! [`RealtimeHub`] pumps the row-store change feed into per-topic broadcast
//! channels. Listeners hold a [`Subscription`]; any number of listeners
//! may share a topic, and releasing one never affects the others.

pub mod channel;
pub mod hub;

pub use channel::{ChannelEvent, ChannelStatus};
pub use hub::{RealtimeHub, Subscription};
