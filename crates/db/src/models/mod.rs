pub mod user_profile;
pub mod widget_settings;
