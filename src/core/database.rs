//! Database-backed settings repository.
//!
//! Reads go through a [`SettingsCache`] first. On a miss the row is fetched;
//! a missing row is inserted from the defaults with `ON CONFLICT DO NOTHING`
//! and then read again, so two tasks racing on the first lookup of the same
//! id both end up with the row that won. Setters are single upserts followed
//! by a re-read that refreshes the cache.
//!
//! No lock is held across a database call, and every call is bounded by the
//! configured timeout. A cache ticket is taken before each read whose result
//! gets cached, so a read that finishes late cannot overwrite the row a later
//! write already put in the cache.

use crate::core::cache::SettingsCache;
use crate::core::repository::{SettingsRepository, prefix_list};
use crate::core::settings::{
    Defaults, GuildSettings, UserSettings, check_id, stored_time_zone,
};
use crate::entities::{PrefixList, SnowflakeList, guild_settings, user_settings};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono_tz::Tz;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default bound for a single database call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings repository persisting through `SeaORM`.
#[derive(Debug)]
pub struct DatabaseRepository {
    db: DatabaseConnection,
    cache: SettingsCache,
    defaults: Arc<Defaults>,
    timeout: Duration,
}

impl DatabaseRepository {
    /// Creates a repository on top of an already connected database whose
    /// tables exist.
    #[must_use]
    pub fn new(db: DatabaseConnection, defaults: Arc<Defaults>, timeout: Duration) -> Self {
        Self {
            db,
            cache: SettingsCache::new(),
            defaults,
            timeout,
        }
    }

    /// Checks that the database answers.
    pub async fn ping(&self) -> Result<()> {
        self.bounded("ping", self.db.ping()).await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = std::result::Result<T, DbErr>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|source| Error::storage(operation, source)),
            Err(_) => Err(Error::StorageTimeout {
                operation,
                timeout: self.timeout,
            }),
        }
    }

    async fn find_guild(&self, key: i64) -> Result<Option<guild_settings::Model>> {
        self.bounded(
            "guild_settings",
            guild_settings::Entity::find_by_id(key).one(&self.db),
        )
        .await
    }

    async fn find_user(&self, key: i64) -> Result<Option<user_settings::Model>> {
        self.bounded(
            "user_settings",
            user_settings::Entity::find_by_id(key).one(&self.db),
        )
        .await
    }

    /// Reads the guild row back after a write and refreshes the cache.
    async fn reload_guild(&self, guild_id: u64, operation: &'static str) -> Result<GuildSettings> {
        let key = store_key(guild_id, "guild")?;
        let ticket = self.cache.guilds.ticket();
        let model = self
            .find_guild(key)
            .await?
            .ok_or_else(|| missing_row(operation))?;
        let settings = guild_from_model(model);
        self.cache.guilds.set(guild_id, &settings, ticket).await;
        Ok(settings)
    }

    async fn reload_user(&self, user_id: u64, operation: &'static str) -> Result<UserSettings> {
        let key = store_key(user_id, "user")?;
        let ticket = self.cache.users.ticket();
        let model = self
            .find_user(key)
            .await?
            .ok_or_else(|| missing_row(operation))?;
        let settings = user_from_model(model);
        self.cache.users.set(user_id, &settings, ticket).await;
        Ok(settings)
    }

    /// Inserts a row seeded from the defaults with `apply` merged in. If the
    /// row already exists only `columns` are overwritten; an empty `columns`
    /// leaves an existing row untouched.
    #[instrument(skip(self, apply), level = "debug")]
    async fn upsert_guild(
        &self,
        guild_id: u64,
        operation: &'static str,
        columns: &[guild_settings::Column],
        apply: impl FnOnce(&mut GuildSettings) + Send,
    ) -> Result<GuildSettings> {
        let key = store_key(guild_id, "guild")?;
        let mut settings = self.defaults.guild_settings();
        apply(&mut settings);

        let on_conflict = on_conflict(guild_settings::Column::GuildId, columns);
        let insert = guild_settings::Entity::insert(guild_active_model(key, settings))
            .on_conflict(on_conflict)
            .exec_without_returning(&self.db);
        let affected = self.bounded(operation, insert).await?;
        debug!(guild_id, affected, "Upserted guild settings");

        self.reload_guild(guild_id, operation).await
    }

    #[instrument(skip(self, apply), level = "debug")]
    async fn upsert_user(
        &self,
        user_id: u64,
        operation: &'static str,
        columns: &[user_settings::Column],
        apply: impl FnOnce(&mut UserSettings) + Send,
    ) -> Result<UserSettings> {
        let key = store_key(user_id, "user")?;
        let mut settings = self.defaults.user_settings();
        apply(&mut settings);

        let on_conflict = on_conflict(user_settings::Column::UserId, columns);
        let insert = user_settings::Entity::insert(user_active_model(key, settings))
            .on_conflict(on_conflict)
            .exec_without_returning(&self.db);
        let affected = self.bounded(operation, insert).await?;
        debug!(user_id, affected, "Upserted user settings");

        self.reload_user(user_id, operation).await
    }
}

#[async_trait]
impl SettingsRepository for DatabaseRepository {
    async fn guild_settings(&self, guild_id: u64) -> Result<GuildSettings> {
        let key = store_key(guild_id, "guild")?;
        if let Some(settings) = self.cache.guilds.get(guild_id).await {
            return Ok(settings);
        }

        let ticket = self.cache.guilds.ticket();
        if let Some(model) = self.find_guild(key).await? {
            let settings = guild_from_model(model);
            self.cache.guilds.set(guild_id, &settings, ticket).await;
            return Ok(settings);
        }

        debug!(guild_id, "No stored guild settings, inserting defaults");
        self.upsert_guild(guild_id, "guild_settings", &[], |_| {}).await
    }

    async fn user_settings(&self, user_id: u64) -> Result<UserSettings> {
        let key = store_key(user_id, "user")?;
        if let Some(settings) = self.cache.users.get(user_id).await {
            return Ok(settings);
        }

        let ticket = self.cache.users.ticket();
        if let Some(model) = self.find_user(key).await? {
            let settings = user_from_model(model);
            self.cache.users.set(user_id, &settings, ticket).await;
            return Ok(settings);
        }

        debug!(user_id, "No stored user settings, inserting defaults");
        self.upsert_user(user_id, "user_settings", &[], |_| {}).await
    }

    async fn set_prefix(&self, guild_id: u64, prefix: &str) -> Result<GuildSettings> {
        let prefixes = prefix_list(prefix);
        self.upsert_guild(
            guild_id,
            "set_prefix",
            &[guild_settings::Column::Prefixes],
            |s| s.prefixes = prefixes,
        )
        .await
    }

    async fn set_guild_language(&self, guild_id: u64, language: &str) -> Result<GuildSettings> {
        let language = language.to_string();
        self.upsert_guild(
            guild_id,
            "set_guild_language",
            &[guild_settings::Column::Language],
            |s| s.language = language,
        )
        .await
    }

    async fn set_user_language(&self, user_id: u64, language: &str) -> Result<UserSettings> {
        let language = language.to_string();
        self.upsert_user(
            user_id,
            "set_user_language",
            &[user_settings::Column::Language],
            |s| s.language = language,
        )
        .await
    }

    async fn set_guild_time_zone(&self, guild_id: u64, time_zone: Tz) -> Result<GuildSettings> {
        self.upsert_guild(
            guild_id,
            "set_guild_time_zone",
            &[guild_settings::Column::TimeZone],
            |s| s.time_zone = time_zone,
        )
        .await
    }

    async fn set_user_time_zone(&self, user_id: u64, time_zone: Tz) -> Result<UserSettings> {
        self.upsert_user(
            user_id,
            "set_user_time_zone",
            &[user_settings::Column::TimeZone],
            |s| s.time_zone = time_zone,
        )
        .await
    }

    async fn set_bot_masters(
        &self,
        guild_id: u64,
        user_ids: Vec<u64>,
        role_ids: Vec<u64>,
    ) -> Result<GuildSettings> {
        self.upsert_guild(
            guild_id,
            "set_bot_masters",
            &[
                guild_settings::Column::BotMasterUserIds,
                guild_settings::Column::BotMasterRoleIds,
            ],
            |s| {
                s.bot_master_user_ids = user_ids;
                s.bot_master_role_ids = role_ids;
            },
        )
        .await
    }
}

/// Converts a snowflake to the signed primary key the store uses.
fn store_key(id: u64, entity: &'static str) -> Result<i64> {
    let id = check_id(id, entity)?;
    i64::try_from(id).map_err(|_| Error::InvalidIdentifier { entity })
}

fn on_conflict<C>(key: C, columns: &[C]) -> OnConflict
where
    C: sea_orm::sea_query::IntoIden + Copy,
{
    let mut on_conflict = OnConflict::column(key);
    if columns.is_empty() {
        on_conflict.do_nothing();
    } else {
        on_conflict.update_columns(columns.iter().copied());
    }
    on_conflict
}

fn missing_row(operation: &'static str) -> Error {
    Error::StorageDecodeFailure {
        operation,
        message: "row vanished right after it was written".to_string(),
    }
}

fn guild_from_model(model: guild_settings::Model) -> GuildSettings {
    GuildSettings {
        prefixes: model.prefixes.0,
        language: model.language,
        time_zone: stored_time_zone(&model.time_zone),
        bot_master_user_ids: model.bot_master_user_ids.0,
        bot_master_role_ids: model.bot_master_role_ids.0,
    }
}

fn user_from_model(model: user_settings::Model) -> UserSettings {
    UserSettings {
        language: model.language,
        time_zone: stored_time_zone(&model.time_zone),
    }
}

fn guild_active_model(key: i64, settings: GuildSettings) -> guild_settings::ActiveModel {
    guild_settings::ActiveModel {
        guild_id: Set(key),
        prefixes: Set(PrefixList(settings.prefixes)),
        language: Set(settings.language),
        time_zone: Set(settings.time_zone.name().to_string()),
        bot_master_user_ids: Set(SnowflakeList(settings.bot_master_user_ids)),
        bot_master_role_ids: Set(SnowflakeList(settings.bot_master_role_ids)),
    }
}

fn user_active_model(key: i64, settings: UserSettings) -> user_settings::ActiveModel {
    user_settings::ActiveModel {
        user_id: Set(key),
        language: Set(settings.language),
        time_zone: Set(settings.time_zone.name().to_string()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{contract, drop_table, setup_test_db, test_defaults};

    async fn repository() -> DatabaseRepository {
        let db = setup_test_db().await.unwrap();
        DatabaseRepository::new(db, Arc::new(test_defaults()), DEFAULT_TIMEOUT)
    }

    #[tokio::test]
    async fn test_unseen_guild_gets_defaults() -> Result<()> {
        contract::unseen_guild_gets_defaults(&repository().await).await
    }

    #[tokio::test]
    async fn test_set_prefix_then_read() -> Result<()> {
        contract::set_prefix_then_read(&repository().await).await
    }

    #[tokio::test]
    async fn test_invalid_ids_are_rejected() {
        contract::invalid_ids_are_rejected(&repository().await).await;
    }

    #[tokio::test]
    async fn test_returned_settings_are_copies() -> Result<()> {
        contract::returned_settings_are_copies(&repository().await).await
    }

    #[tokio::test]
    async fn test_concurrent_set_prefix_last_writer_wins() -> Result<()> {
        contract::concurrent_set_prefix(Arc::new(repository().await)).await
    }

    #[tokio::test]
    async fn test_user_settings_round_trip() -> Result<()> {
        contract::user_settings_round_trip(&repository().await).await
    }

    #[tokio::test]
    async fn test_guild_setters_keep_other_fields() -> Result<()> {
        contract::guild_setters_keep_other_fields(&repository().await).await
    }

    #[tokio::test]
    async fn test_first_read_persists_defaults() -> Result<()> {
        let repo = repository().await;
        repo.guild_settings(42).await?;

        let stored = guild_settings::Entity::find_by_id(42_i64)
            .one(&repo.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.prefixes, PrefixList(vec!["!".to_string()]));
        assert_eq!(stored.language, "en");
        assert_eq!(stored.time_zone, "UTC");
        Ok(())
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() -> Result<()> {
        let repo = repository().await;
        let first = repo.guild_settings(42).await?;

        // a store query would now fail
        drop_table(&repo.db, "guild_settings").await?;

        let second = repo.guild_settings(42).await?;
        assert_eq!(first, second);
        assert!(repo.guild_settings(43).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_row_is_not_overwritten_by_first_read() -> Result<()> {
        let repo = repository().await;
        guild_settings::Entity::insert(guild_active_model(
            7,
            GuildSettings {
                prefixes: vec!["$".to_string()],
                language: "de".to_string(),
                time_zone: Tz::Europe__Berlin,
                bot_master_user_ids: vec![1],
                bot_master_role_ids: Vec::new(),
            },
        ))
        .exec_without_returning(&repo.db)
        .await
        .unwrap();

        let settings = repo.guild_settings(7).await?;
        assert_eq!(settings.prefixes, vec!["$".to_string()]);
        assert_eq!(settings.language, "de");
        assert_eq!(settings.time_zone, Tz::Europe__Berlin);
        assert_eq!(settings.bot_master_user_ids, vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_first_reads_agree() -> Result<()> {
        let repo = Arc::new(repository().await);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move { repo.user_settings(99).await }));
        }
        for handle in handles {
            let settings = handle.await.unwrap()?;
            assert_eq!(settings.language, "en");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_stored_time_zone_reads_as_utc() -> Result<()> {
        let repo = repository().await;
        user_settings::Entity::insert(user_settings::ActiveModel {
            user_id: Set(5),
            language: Set("en".to_string()),
            time_zone: Set("Atlantis/Capital".to_string()),
        })
        .exec_without_returning(&repo.db)
        .await
        .unwrap();

        assert_eq!(repo.user_time_zone(5).await?, Tz::UTC);
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_id_is_invalid() {
        let repo = repository().await;
        assert!(matches!(
            repo.guild_settings(u64::MAX).await,
            Err(Error::InvalidIdentifier { entity: "guild" })
        ));
    }

    #[tokio::test]
    async fn test_late_read_does_not_overwrite_newer_write() -> Result<()> {
        let repo = repository().await;
        let stale = repo.guild_settings(42).await?;

        // a reader fetched `stale` before the write below but caches it after
        let reader = repo.cache.guilds.ticket();
        repo.set_prefix(42, "?").await?;
        assert!(!repo.cache.guilds.set(42, &stale, reader).await);

        assert_eq!(repo.prefixes(42).await?, vec!["?".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_during_miss_read_is_not_lost() -> Result<()> {
        let repo = repository().await;
        repo.user_settings(8).await?;
        let fresh = DatabaseRepository::new(
            repo.db.clone(),
            Arc::new(test_defaults()),
            DEFAULT_TIMEOUT,
        );

        // `fresh` has an empty cache, so its read takes the miss path
        let reader = fresh.cache.users.ticket();
        let before = fresh.find_user(8).await?.unwrap();
        fresh.set_user_language(8, "de").await?;
        assert!(!fresh.cache.users.set(8, &user_from_model(before), reader).await);

        assert_eq!(fresh.user_language(8).await?, "de");
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let db = setup_test_db().await.unwrap();
        let repo = DatabaseRepository::new(
            db,
            Arc::new(test_defaults()),
            Duration::from_millis(10),
        );

        let result = repo
            .bounded(
                "guild_settings",
                std::future::pending::<std::result::Result<(), DbErr>>(),
            )
            .await;
        assert!(matches!(
            result,
            Err(Error::StorageTimeout {
                operation: "guild_settings",
                timeout,
            }) if timeout == Duration::from_millis(10)
        ));
    }

    #[tokio::test]
    async fn test_ping() -> Result<()> {
        repository().await.ping().await
    }
}
