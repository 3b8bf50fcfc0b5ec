//! Client-side settings flow.
//!
//! - [`gateway`]: the read/write boundary to the row-store. Reads are open
//!   to anyone; writes require a verified [`Identity`](gateway::Identity).
//! - [`store`]: the per-widget authoritative local value with optimistic
//!   mutation, cold loads and live updates.
//! - [`overlay`]: the public overlay state machine.

use std::time::Duration;

pub mod gateway;
pub mod overlay;
pub mod store;

pub use gateway::{
    GatewayError, Identity, SettingsReader, SettingsWriter, StoreGateway, StoredSettings,
};
pub use overlay::{OverlayState, PublicOverlay};
pub use store::{
    dyn_store, DynSettingsStore, PublicSource, SettingsError, SettingsStore, StoreRegistry,
};

/// Default bound on a public cold load before falling back to defaults.
pub const DEFAULT_COLD_LOAD_TIMEOUT: Duration = Duration::from_secs(3);

/// Default number of username lookups attempted on transport failure.
pub const DEFAULT_RESOLVE_ATTEMPTS: u32 = 3;

/// Timing knobs for stores and overlays.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on a public cold load (resolve + fetch).
    pub cold_load_timeout: Duration,
    /// Username lookups attempted before an overlay gives up with
    /// `NotFound`. Retries back off exponentially.
    pub resolve_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cold_load_timeout: DEFAULT_COLD_LOAD_TIMEOUT,
            resolve_attempts: DEFAULT_RESOLVE_ATTEMPTS,
        }
    }
}
