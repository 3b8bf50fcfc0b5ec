//! Repository for the `widget_settings` table.

use overlay_core::widget::WidgetType;
use sqlx::PgPool;

use crate::models::widget_settings::WidgetSettingsRow;

/// Column list for `widget_settings` queries.
const COLUMNS: &str = "user_id, widget_type, settings, version, updated_at";

/// Provides select and merge-upsert for per-user widget settings.
pub struct WidgetSettingsRepo;

impl WidgetSettingsRepo {
    /// Find a user's settings for one widget. Returns `None` if never saved.
    pub async fn find(
        pool: &PgPool,
        user_id: &str,
        widget: WidgetType,
    ) -> Result<Option<WidgetSettingsRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM widget_settings WHERE user_id = $1 AND widget_type = $2"
        );
        sqlx::query_as::<_, WidgetSettingsRow>(&query)
            .bind(user_id)
            .bind(widget.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Merge `partial` into the stored document, creating the row if absent.
    ///
    /// Single statement: `ON CONFLICT (user_id, widget_type) DO UPDATE` with
    /// a server-side deep merge, so concurrent writers never lose each
    /// other's fields to a read-then-write race. Bumps `version`.
    pub async fn upsert_merge(
        pool: &PgPool,
        user_id: &str,
        widget: WidgetType,
        partial: &serde_json::Value,
    ) -> Result<WidgetSettingsRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO widget_settings (user_id, widget_type, settings) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, widget_type) DO UPDATE \
             SET settings = jsonb_deep_merge(widget_settings.settings, EXCLUDED.settings), \
                 version = widget_settings.version + 1, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WidgetSettingsRow>(&query)
            .bind(user_id)
            .bind(widget.as_str())
            .bind(partial)
            .fetch_one(pool)
            .await
    }
}
