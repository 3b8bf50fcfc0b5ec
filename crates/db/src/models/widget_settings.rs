//! Widget settings entity model.

use overlay_core::change::SettingsChange;
use overlay_core::types::{Timestamp, UserId, Version};
use overlay_core::widget::WidgetType;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// A row from the `widget_settings` table.
///
/// `settings` is the stored document exactly as merged by the store; it
/// is not guaranteed to match the current schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetSettingsRow {
    pub user_id: UserId,
    pub widget_type: WidgetType,
    pub settings: serde_json::Value,
    pub version: Version,
    pub updated_at: Timestamp,
}

impl WidgetSettingsRow {
    /// The change-feed snapshot for this row.
    pub fn to_change(&self) -> SettingsChange {
        SettingsChange {
            user_id: self.user_id.clone(),
            widget_type: self.widget_type,
            settings: self.settings.clone(),
            version: self.version,
            updated_at: self.updated_at,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for WidgetSettingsRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let widget: String = row.try_get("widget_type")?;
        let widget_type = widget
            .parse::<WidgetType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "widget_type".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            user_id: row.try_get("user_id")?,
            widget_type,
            settings: row.try_get("settings")?,
            version: row.try_get("version")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
