//! Domain core for overlay widget settings.
//!
//! Pure data and pure functions only: widget schemas with canonical
//! defaults, strict validation, the reconciliation merge applied on every
//! read, and the topic naming shared by the change feed and the realtime
//! channel.

pub mod backoff;
pub mod change;
pub mod error;
pub mod merge;
pub mod reconcile;
pub mod schema;
pub mod topics;
pub mod types;
pub mod widget;
