//! Guild settings entity - one row per guild, created on first lookup.

use super::{PrefixList, SnowflakeList};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guild settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guild_settings")]
pub struct Model {
    /// Discord guild id
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    /// Command prefixes; empty means mentions only
    pub prefixes: PrefixList,
    /// BCP 47 language tag
    pub language: String,
    /// Canonical IANA zone name
    pub time_zone: String,
    /// Users granted bot-master status
    pub bot_master_user_ids: SnowflakeList,
    /// Roles granting bot-master status
    pub bot_master_role_ids: SnowflakeList,
}

/// Guild settings have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
