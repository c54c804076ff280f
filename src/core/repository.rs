//! The settings repository contract.
//!
//! Two implementations exist: [`MemoryRepository`](crate::core::memory::MemoryRepository)
//! keeps everything in process memory, [`DatabaseRepository`](crate::core::database::DatabaseRepository)
//! persists through `SeaORM` behind a read-through cache. Commands and the
//! settings provider only ever see `dyn SettingsRepository`.
//!
//! Ids are raw Discord snowflakes. Zero is rejected with
//! [`Error::InvalidIdentifier`](crate::errors::Error::InvalidIdentifier)
//! before any storage access.

use crate::core::settings::{GuildSettings, UserSettings};
use crate::errors::Result;
use async_trait::async_trait;
use chrono_tz::Tz;

/// Storage for guild and user settings with create-on-first-read semantics.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Settings of a guild; a default record is created if none exists.
    async fn guild_settings(&self, guild_id: u64) -> Result<GuildSettings>;

    /// Settings of a user; a default record is created if none exists.
    async fn user_settings(&self, user_id: u64) -> Result<UserSettings>;

    /// Replaces the guild's prefixes with the passed one. An empty prefix
    /// switches the guild to mention-only invocation.
    async fn set_prefix(&self, guild_id: u64, prefix: &str) -> Result<GuildSettings>;

    /// Sets the language of a guild.
    async fn set_guild_language(&self, guild_id: u64, language: &str) -> Result<GuildSettings>;

    /// Sets the language used in direct messages with a user.
    async fn set_user_language(&self, user_id: u64, language: &str) -> Result<UserSettings>;

    /// Sets the time zone of a guild.
    async fn set_guild_time_zone(&self, guild_id: u64, time_zone: Tz) -> Result<GuildSettings>;

    /// Sets the time zone of a user.
    async fn set_user_time_zone(&self, user_id: u64, time_zone: Tz) -> Result<UserSettings>;

    /// Replaces the bot-master user and role lists of a guild.
    async fn set_bot_masters(
        &self,
        guild_id: u64,
        user_ids: Vec<u64>,
        role_ids: Vec<u64>,
    ) -> Result<GuildSettings>;

    /// Prefixes of a guild; empty means mentions only.
    async fn prefixes(&self, guild_id: u64) -> Result<Vec<String>> {
        Ok(self.guild_settings(guild_id).await?.prefixes)
    }

    /// Language tag of a guild.
    async fn guild_language(&self, guild_id: u64) -> Result<String> {
        Ok(self.guild_settings(guild_id).await?.language)
    }

    /// Language tag of a user.
    async fn user_language(&self, user_id: u64) -> Result<String> {
        Ok(self.user_settings(user_id).await?.language)
    }

    /// Time zone of a guild.
    async fn guild_time_zone(&self, guild_id: u64) -> Result<Tz> {
        Ok(self.guild_settings(guild_id).await?.time_zone)
    }

    /// Time zone of a user.
    async fn user_time_zone(&self, user_id: u64) -> Result<Tz> {
        Ok(self.user_settings(user_id).await?.time_zone)
    }
}

/// Turns the argument of [`SettingsRepository::set_prefix`] into the stored list.
pub(crate) fn prefix_list(prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        Vec::new()
    } else {
        vec![prefix.to_string()]
    }
}
