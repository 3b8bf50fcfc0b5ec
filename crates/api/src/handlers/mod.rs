//! Request handlers.
//!
//! - [`widgets`] -- authenticated dashboard reads and writes, plus defaults.
//! - [`public`] -- unauthenticated overlay cold load.

pub mod public;
pub mod widgets;

use overlay_core::widget::WidgetType;

use crate::error::AppResult;

/// Parse a `{widget}` path segment. Unknown kinds are 404.
pub(crate) fn parse_widget(raw: &str) -> AppResult<WidgetType> {
    Ok(raw.parse()?)
}
