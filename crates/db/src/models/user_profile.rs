//! Public profile entity: the username -> user id lookup.

use serde::Serialize;
use sqlx::FromRow;
use overlay_core::types::{Timestamp, UserId};

/// A row from the `user_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: Timestamp,
}
