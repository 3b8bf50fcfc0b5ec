//! WebSocket infrastructure for realtime settings delivery.
//!
//! Two sockets share one connection registry and heartbeat:
//! - the public overlay socket streams overlay state for one widget;
//! - the editor socket serves the authenticated dashboard.

mod editor;
mod heartbeat;
pub mod manager;
mod overlay;
pub mod protocol;

pub use editor::editor_ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{ConnectionKind, WsManager};
pub use overlay::overlay_ws_handler;
