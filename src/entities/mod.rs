//! Entity module - `SeaORM` entity definitions for the settings tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod guild_settings;
pub mod user_settings;

use serde::{Deserialize, Serialize};
use sea_orm::FromJsonQueryResult;

// Re-export specific types to avoid conflicts
pub use guild_settings::{
    Column as GuildSettingsColumn, Entity as GuildSettings, Model as GuildSettingsModel,
};
pub use user_settings::{
    Column as UserSettingsColumn, Entity as UserSettings, Model as UserSettingsModel,
};

/// Ordered list of command prefixes, stored as a JSON array
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PrefixList(pub Vec<String>);

/// List of Discord ids, stored as a JSON array
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SnowflakeList(pub Vec<u64>);
