//! Keepalive pings for overlay and editor sockets.
//!
//! Overlay pages sit idle inside streaming software for hours between
//! settings changes, so proxies would otherwise reap their sockets.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ws::manager::{ConnectionKind, WsManager};

/// Spawn a task that pings every open socket once per `every`.
///
/// The first ping goes out one full interval after start. Ticks with no
/// open sockets are skipped. Stops when `cancel` fires.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let overlays = ws_manager.count_by_kind(ConnectionKind::Overlay).await;
            let editors = ws_manager.count_by_kind(ConnectionKind::Editor).await;
            if overlays + editors == 0 {
                continue;
            }
            tracing::debug!(overlays, editors, "WebSocket heartbeat ping");
            ws_manager.ping_all().await;
        }
        tracing::debug!("Heartbeat stopped");
    })
}
