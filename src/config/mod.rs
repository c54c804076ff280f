/// Application configuration from `levin.toml` and environment variables
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Bot presence (status and activity) parsing
pub mod presence;

pub use app::{AppConfig, load_app_configuration};
