use std::sync::Arc;

use overlay_client::StoreGateway;
use overlay_db::RowStore;
use overlay_events::RealtimeHub;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Row store backing every read and write.
    pub store: Arc<dyn RowStore>,
    /// Reader/writer gateway over `store`.
    pub gateway: Arc<StoreGateway>,
    /// Realtime topic fan-out fed by the store's change feed.
    pub hub: Arc<RealtimeHub>,
    /// WebSocket connection registry (overlays and editors).
    pub ws_manager: Arc<WsManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn RowStore>, hub: Arc<RealtimeHub>, config: ServerConfig) -> Self {
        Self {
            gateway: Arc::new(StoreGateway::new(Arc::clone(&store))),
            store,
            hub,
            ws_manager: Arc::new(WsManager::new()),
            config: Arc::new(config),
        }
    }
}
