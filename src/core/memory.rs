//! Process-local settings repository, used when no database is configured.

use crate::core::repository::{SettingsRepository, prefix_list};
use crate::core::settings::{Defaults, GuildSettings, UserSettings, check_id};
use crate::errors::Result;
use async_trait::async_trait;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Settings repository backed by mutex-guarded maps.
#[derive(Debug)]
pub struct MemoryRepository {
    guilds: Mutex<HashMap<u64, GuildSettings>>,
    users: Mutex<HashMap<u64, UserSettings>>,
    defaults: Arc<Defaults>,
}

impl MemoryRepository {
    /// Creates an empty repository that materializes records from `defaults`.
    #[must_use]
    pub fn new(defaults: Arc<Defaults>) -> Self {
        Self {
            guilds: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            defaults,
        }
    }

    async fn update_guild(
        &self,
        guild_id: u64,
        apply: impl FnOnce(&mut GuildSettings) + Send,
    ) -> Result<GuildSettings> {
        let guild_id = check_id(guild_id, "guild")?;
        let mut guilds = self.guilds.lock().await;
        let settings = guilds
            .entry(guild_id)
            .or_insert_with(|| self.defaults.guild_settings());
        apply(settings);
        Ok(settings.clone())
    }

    async fn update_user(
        &self,
        user_id: u64,
        apply: impl FnOnce(&mut UserSettings) + Send,
    ) -> Result<UserSettings> {
        let user_id = check_id(user_id, "user")?;
        let mut users = self.users.lock().await;
        let settings = users
            .entry(user_id)
            .or_insert_with(|| self.defaults.user_settings());
        apply(settings);
        Ok(settings.clone())
    }
}

#[async_trait]
impl SettingsRepository for MemoryRepository {
    async fn guild_settings(&self, guild_id: u64) -> Result<GuildSettings> {
        self.update_guild(guild_id, |_| {}).await
    }

    async fn user_settings(&self, user_id: u64) -> Result<UserSettings> {
        self.update_user(user_id, |_| {}).await
    }

    async fn set_prefix(&self, guild_id: u64, prefix: &str) -> Result<GuildSettings> {
        debug!(guild_id, prefix, "Setting guild prefix");
        let prefixes = prefix_list(prefix);
        self.update_guild(guild_id, |s| s.prefixes = prefixes).await
    }

    async fn set_guild_language(&self, guild_id: u64, language: &str) -> Result<GuildSettings> {
        let language = language.to_string();
        self.update_guild(guild_id, |s| s.language = language).await
    }

    async fn set_user_language(&self, user_id: u64, language: &str) -> Result<UserSettings> {
        let language = language.to_string();
        self.update_user(user_id, |s| s.language = language).await
    }

    async fn set_guild_time_zone(&self, guild_id: u64, time_zone: Tz) -> Result<GuildSettings> {
        self.update_guild(guild_id, |s| s.time_zone = time_zone).await
    }

    async fn set_user_time_zone(&self, user_id: u64, time_zone: Tz) -> Result<UserSettings> {
        self.update_user(user_id, |s| s.time_zone = time_zone).await
    }

    async fn set_bot_masters(
        &self,
        guild_id: u64,
        user_ids: Vec<u64>,
        role_ids: Vec<u64>,
    ) -> Result<GuildSettings> {
        self.update_guild(guild_id, |s| {
            s.bot_master_user_ids = user_ids;
            s.bot_master_role_ids = role_ids;
        })
        .await
    }
}
