//! Core settings logic - framework-agnostic settings records, repositories,
//! caching, translations and per-message resolution.

/// In-memory read-through cache for settings records
pub mod cache;
/// Database-backed repository
pub mod database;
/// Translation catalogs and localizers
pub mod i18n;
/// Process-local repository
pub mod memory;
/// Per-message settings resolution and error reporting
pub mod provider;
/// The repository contract
pub mod repository;
/// Settings records and defaults
pub mod settings;
/// Per-guild rate limiting
pub mod throttle;

pub use database::DatabaseRepository;
pub use memory::MemoryRepository;
pub use repository::SettingsRepository;
