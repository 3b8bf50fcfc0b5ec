//! Repository structs, one per table.
//!
//! Each repository is a zero-sized struct with async associated functions
//! that take a `&PgPool` as their first argument.

pub mod user_profile_repo;
pub mod widget_settings_repo;

pub use user_profile_repo::UserProfileRepo;
pub use widget_settings_repo::WidgetSettingsRepo;
