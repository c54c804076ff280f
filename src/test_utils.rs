//! Shared test utilities.
//!
//! Provides an in-memory `SQLite` database with the settings tables, the
//! defaults every repository test uses, and a contract suite that both
//! repository implementations run.

use crate::{
    core::{provider::ErrorReporter, settings::Defaults},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use std::{sync::Mutex, time::Duration};

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db =
        crate::config::database::create_connection("sqlite::memory:", Duration::from_secs(5))
            .await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Drops a settings table so every later query on it fails like an outage.
pub async fn drop_table(db: &DatabaseConnection, table: &str) -> Result<()> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        format!("DROP TABLE {table}"),
    ))
    .await
    .map_err(|source| Error::storage("drop_table", source))?;
    Ok(())
}

/// Keeps every report as `"{source}: {error}"`.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    /// Reports in arrival order
    pub reports: Mutex<Vec<String>>,
}

impl RecordingReporter {
    /// Snapshot of the reports so far.
    #[allow(clippy::unwrap_used)]
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    #[allow(clippy::unwrap_used)]
    fn report(&self, source: &'static str, error: &Error) {
        self.reports
            .lock()
            .unwrap()
            .push(format!("{source}: {error}"));
    }
}

/// Defaults used by repository tests: prefix `!`, English, UTC.
#[must_use]
pub fn test_defaults() -> Defaults {
    Defaults::new(vec!["!".to_string()], "en", None)
}

/// Behaviour every [`SettingsRepository`](crate::core::repository::SettingsRepository)
/// must show, run against each implementation from its own test module.
pub mod contract {
    #![allow(clippy::unwrap_used)]

    use crate::core::repository::SettingsRepository;
    use crate::errors::{Error, Result};
    use chrono_tz::Tz;
    use std::sync::Arc;

    /// Fresh guild yields the defaults, repeat reads are identical.
    pub async fn unseen_guild_gets_defaults(repo: &dyn SettingsRepository) -> Result<()> {
        let settings = repo.guild_settings(42).await?;
        assert_eq!(settings.prefixes, vec!["!".to_string()]);
        assert_eq!(settings.language, "en");
        assert_eq!(settings.time_zone, Tz::UTC);

        assert_eq!(repo.guild_settings(42).await?, settings);
        assert_eq!(repo.user_language(1234).await?, "en");
        Ok(())
    }

    /// `set_prefix` replaces the prefixes, existing guild or not.
    pub async fn set_prefix_then_read(repo: &dyn SettingsRepository) -> Result<()> {
        repo.guild_settings(42).await?;
        repo.set_prefix(42, "?").await?;
        let settings = repo.guild_settings(42).await?;
        assert_eq!(settings.prefixes, vec!["?".to_string()]);
        assert_eq!(settings.language, "en");

        // never seen before
        repo.set_prefix(77, "%").await?;
        assert_eq!(repo.prefixes(77).await?, vec!["%".to_string()]);

        // empty prefix means mentions only
        repo.set_prefix(77, "").await?;
        assert!(repo.prefixes(77).await?.is_empty());
        Ok(())
    }

    /// Zero ids fail every operation with `InvalidIdentifier`.
    pub async fn invalid_ids_are_rejected(repo: &dyn SettingsRepository) {
        let is_invalid = |result: std::result::Result<(), Error>| {
            matches!(result, Err(Error::InvalidIdentifier { .. }))
        };

        assert!(is_invalid(repo.guild_settings(0).await.map(|_| ())));
        assert!(is_invalid(repo.user_settings(0).await.map(|_| ())));
        assert!(is_invalid(repo.prefixes(0).await.map(|_| ())));
        assert!(is_invalid(repo.guild_language(0).await.map(|_| ())));
        assert!(is_invalid(repo.user_language(0).await.map(|_| ())));
        assert!(is_invalid(repo.guild_time_zone(0).await.map(|_| ())));
        assert!(is_invalid(repo.user_time_zone(0).await.map(|_| ())));
        assert!(is_invalid(repo.set_prefix(0, "?").await.map(|_| ())));
        assert!(is_invalid(repo.set_guild_language(0, "de").await.map(|_| ())));
        assert!(is_invalid(repo.set_user_language(0, "de").await.map(|_| ())));
        assert!(is_invalid(repo.set_guild_time_zone(0, Tz::UTC).await.map(|_| ())));
        assert!(is_invalid(repo.set_user_time_zone(0, Tz::UTC).await.map(|_| ())));
        assert!(is_invalid(
            repo.set_bot_masters(0, vec![1], Vec::new()).await.map(|_| ())
        ));
    }

    /// Mutating a returned record does not leak into the repository.
    pub async fn returned_settings_are_copies(repo: &dyn SettingsRepository) -> Result<()> {
        let mut settings = repo.guild_settings(42).await?;
        settings.prefixes.clear();
        settings.language = "xx".to_string();
        settings.bot_master_user_ids.push(5);

        let again = repo.guild_settings(42).await?;
        assert_eq!(again.prefixes, vec!["!".to_string()]);
        assert_eq!(again.language, "en");
        assert!(again.bot_master_user_ids.is_empty());

        let mut user = repo.user_settings(3).await?;
        user.time_zone = Tz::Asia__Tokyo;
        assert_eq!(repo.user_time_zone(3).await?, Tz::UTC);
        Ok(())
    }

    /// Concurrent writers leave exactly one of the written prefixes.
    pub async fn concurrent_set_prefix<R>(repo: Arc<R>) -> Result<()>
    where
        R: SettingsRepository + 'static,
    {
        let candidates: Vec<String> = (0..12).map(|i| format!("p{i}")).collect();
        let mut handles = Vec::new();
        for prefix in candidates.clone() {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.set_prefix(42, &prefix).await?;
                repo.prefixes(42).await
            }));
        }
        for handle in handles {
            let prefixes = handle.await.unwrap()?;
            assert_eq!(prefixes.len(), 1);
        }

        let last = repo.prefixes(42).await?;
        assert_eq!(last.len(), 1);
        assert!(candidates.contains(&last[0]));
        Ok(())
    }

    /// User setters are visible to later reads.
    pub async fn user_settings_round_trip(repo: &dyn SettingsRepository) -> Result<()> {
        repo.set_user_language(8, "de").await?;
        repo.set_user_time_zone(8, Tz::America__New_York).await?;

        let settings = repo.user_settings(8).await?;
        assert_eq!(settings.language, "de");
        assert_eq!(settings.time_zone, Tz::America__New_York);
        Ok(())
    }

    /// Each guild setter touches only its own field.
    pub async fn guild_setters_keep_other_fields(repo: &dyn SettingsRepository) -> Result<()> {
        repo.set_prefix(42, "?").await?;
        repo.set_guild_language(42, "de").await?;
        repo.set_guild_time_zone(42, Tz::Europe__Berlin).await?;
        repo.set_bot_masters(42, vec![10, 11], vec![20]).await?;

        let settings = repo.guild_settings(42).await?;
        assert_eq!(settings.prefixes, vec!["?".to_string()]);
        assert_eq!(settings.language, "de");
        assert_eq!(settings.time_zone, Tz::Europe__Berlin);
        assert_eq!(settings.bot_master_user_ids, vec![10, 11]);
        assert_eq!(settings.bot_master_role_ids, vec![20]);

        assert_eq!(repo.guild_language(42).await?, "de");
        assert_eq!(repo.guild_time_zone(42).await?, Tz::Europe__Berlin);
        Ok(())
    }
}
