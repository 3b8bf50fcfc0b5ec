//! Persistence gateway: the only path from the client flow to storage.
//!
//! Split by privilege. [`SettingsReader`] serves the public overlay with no
//! credentials. [`SettingsWriter`] demands an [`Identity`], and the only way
//! to get one is from a verified bearer credential, so there is no
//! unauthenticated path to a write.

use std::sync::Arc;

use async_trait::async_trait;
use overlay_core::types::{Timestamp, UserId, Version};
use overlay_core::widget::WidgetType;
use overlay_db::models::widget_settings::WidgetSettingsRow;
use overlay_db::{RowStore, StoreError};
use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
}

impl Identity {
    /// Build from the subject of a credential whose signature and expiry
    /// have already been checked.
    pub fn from_verified_subject(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

// ---------------------------------------------------------------------------
// StoredSettings
// ---------------------------------------------------------------------------

/// A row as returned across the gateway. `settings` is unreconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSettings {
    pub user_id: UserId,
    pub widget_type: WidgetType,
    pub settings: Value,
    pub version: Version,
    pub updated_at: Timestamp,
}

impl From<WidgetSettingsRow> for StoredSettings {
    fn from(row: WidgetSettingsRow) -> Self {
        Self {
            user_id: row.user_id,
            widget_type: row.widget_type,
            settings: row.settings,
            version: row.version,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Connectivity failure. Safe to retry.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store refused the write or returned an unreadable row.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        cause: Option<String>,
    },

    /// A username does not map to a user.
    #[error("Unknown username: {0}")]
    Resolution(String),
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transport(msg) => GatewayError::Transport(msg),
            StoreError::Rejected { message, cause } => GatewayError::Persistence { message, cause },
            StoreError::Decode(message) => GatewayError::Persistence {
                message,
                cause: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Unauthenticated reads.
#[async_trait]
pub trait SettingsReader: Send + Sync {
    /// The stored row for `(user_id, widget)`, or `None` if never saved.
    async fn load(
        &self,
        user_id: &str,
        widget: WidgetType,
    ) -> Result<Option<StoredSettings>, GatewayError>;

    /// Map a public username to its user id. Unknown names are `Ok(None)`.
    async fn resolve_username(&self, username: &str) -> Result<Option<UserId>, GatewayError>;
}

/// Authenticated writes.
#[async_trait]
pub trait SettingsWriter: Send + Sync {
    /// Merge `partial` into the caller's own row and return the result.
    async fn save(
        &self,
        identity: &Identity,
        widget: WidgetType,
        partial: &Value,
    ) -> Result<StoredSettings, GatewayError>;
}

// ---------------------------------------------------------------------------
// StoreGateway
// ---------------------------------------------------------------------------

/// Both gateway halves over a shared [`RowStore`].
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn RowStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsReader for StoreGateway {
    async fn load(
        &self,
        user_id: &str,
        widget: WidgetType,
    ) -> Result<Option<StoredSettings>, GatewayError> {
        let row = self.store.select_settings(user_id, widget).await?;
        Ok(row.map(StoredSettings::from))
    }

    async fn resolve_username(&self, username: &str) -> Result<Option<UserId>, GatewayError> {
        if username.is_empty() {
            return Ok(None);
        }
        let profile = self.store.find_profile_by_username(username).await?;
        Ok(profile.map(|p| p.user_id))
    }
}

#[async_trait]
impl SettingsWriter for StoreGateway {
    async fn save(
        &self,
        identity: &Identity,
        widget: WidgetType,
        partial: &Value,
    ) -> Result<StoredSettings, GatewayError> {
        let row = self
            .store
            .upsert_settings(identity.user_id(), widget, partial)
            .await?;

        tracing::debug!(
            user_id = %row.user_id,
            widget = %widget,
            version = row.version,
            "Settings saved",
        );
        Ok(row.into())
    }
}
