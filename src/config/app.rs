//! Application configuration.
//!
//! Values come from a TOML file and are then overridden by `LEVIN_*`
//! environment variables (after `.env` has been loaded by `main`). Without an
//! explicit path, `levin.toml` is searched in `.`, `./config` and
//! `$CONFIG_DIR`; finding none is not an error.

use crate::core::i18n::normalize_language_tag;
use crate::core::settings::{Defaults, FALLBACK_LANGUAGE, parse_time_zone};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// File name searched for when no explicit config path is given
pub const CONFIG_FILE_NAME: &str = "levin.toml";

/// Configuration for the whole bot
#[derive(Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Discord bot token
    pub bot_token: String,
    /// Ids of the bot owners
    pub owners: Vec<u64>,
    /// Prefix for guilds without stored settings; empty means mentions only
    pub default_prefix: String,
    /// Language for guilds and users without stored settings
    pub default_language: String,
    /// IANA time zone for guilds and users without stored settings
    pub default_time_zone: String,
    /// Presence status: online, idle, dnd or invisible
    pub status: String,
    /// Presence activity, e.g. `Playing with settings`
    pub activity: String,
    /// Stream URL, used with a `Streaming` activity
    pub activity_url: Option<String>,
    /// Seconds during which edited messages are re-run as commands
    pub edit_age: u64,
    /// Whether messages of other bots may invoke commands
    pub allow_bot: bool,
    /// Directory with additional translation catalogs
    pub translations_path: Option<PathBuf>,
    /// Settings database
    pub database: DatabaseConfig,
}

/// Settings database configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; without one settings are kept in memory only
    pub url: Option<String>,
    /// Seconds a single database call may take
    pub timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            owners: Vec::new(),
            default_prefix: String::new(),
            default_language: FALLBACK_LANGUAGE.to_string(),
            default_time_zone: "UTC".to_string(),
            status: "online".to_string(),
            activity: String::new(),
            activity_url: None,
            edit_age: 15,
            allow_bot: false,
            translations_path: None,
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: 5,
        }
    }
}

// keeps the token out of logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &"<redacted>")
            .field("owners", &self.owners)
            .field("default_prefix", &self.default_prefix)
            .field("default_language", &self.default_language)
            .field("default_time_zone", &self.default_time_zone)
            .field("status", &self.status)
            .field("activity", &self.activity)
            .field("edit_age", &self.edit_age)
            .field("allow_bot", &self.allow_bot)
            .field("translations_path", &self.translations_path)
            .field("database_configured", &self.database.url.is_some())
            .field("database_timeout", &self.database.timeout)
            .finish()
    }
}

impl AppConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse configuration: {e}"),
        })
    }

    /// Applies `LEVIN_*` overrides looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        let first = |names: &[&str]| names.iter().find_map(|name| var(name));

        if let Some(token) = first(&["LEVIN_BOT_TOKEN"]) {
            self.bot_token = token;
        }
        if let Some(owners) = first(&["LEVIN_OWNERS"]) {
            self.owners = owners
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_env("LEVIN_OWNERS", s))
                .collect::<Result<_>>()?;
        }
        if let Some(prefix) = first(&["LEVIN_DEFAULT_PREFIX"]) {
            self.default_prefix = prefix;
        }
        if let Some(language) = first(&["LEVIN_DEFAULT_LANG", "LEVIN_DEFAULT_LANGUAGE"]) {
            self.default_language = language;
        }
        if let Some(time_zone) = first(&["LEVIN_DEFAULT_TZ", "LEVIN_DEFAULT_TIME_ZONE"]) {
            self.default_time_zone = time_zone;
        }
        if let Some(status) = first(&["LEVIN_STATUS"]) {
            self.status = status;
        }
        if let Some(activity) = first(&["LEVIN_ACTIVITY"]) {
            self.activity = activity;
        }
        if let Some(url) = first(&["LEVIN_ACTIVITY_URL"]) {
            self.activity_url = Some(url);
        }
        if let Some(edit_age) = first(&["LEVIN_EDIT_AGE"]) {
            self.edit_age = parse_env("LEVIN_EDIT_AGE", &edit_age)?;
        }
        if let Some(allow_bot) = first(&["LEVIN_ALLOW_BOT"]) {
            self.allow_bot = parse_env("LEVIN_ALLOW_BOT", &allow_bot)?;
        }
        if let Some(path) = first(&["LEVIN_TRANSLATIONS_PATH"]) {
            self.translations_path = Some(PathBuf::from(path));
        }
        if let Some(url) = first(&["LEVIN_DATABASE_URL", "DATABASE_URL"]) {
            self.database.url = Some(url).filter(|url| !url.is_empty());
        }
        if let Some(timeout) = first(&["LEVIN_DATABASE_TIMEOUT"]) {
            self.database.timeout = parse_env("LEVIN_DATABASE_TIMEOUT", &timeout)?;
        }
        Ok(())
    }

    /// The normalized defaults for new guilds and users.
    ///
    /// An unparsable language falls back to English and an unknown time zone
    /// to UTC, both with a warning.
    #[must_use]
    pub fn defaults(&self) -> Defaults {
        let language = normalize_language_tag(&self.default_language).unwrap_or_else(|| {
            if !self.default_language.is_empty() {
                warn!(language = %self.default_language, "Invalid default language, using English");
            }
            FALLBACK_LANGUAGE.to_string()
        });

        let time_zone = parse_time_zone(&self.default_time_zone);
        if time_zone.is_none() && !self.default_time_zone.is_empty() {
            warn!(time_zone = %self.default_time_zone, "Unknown default time zone, using UTC");
        }

        Defaults::new(vec![self.default_prefix.clone()], language, time_zone)
    }

    /// Bound for a single database call
    #[must_use]
    pub const fn database_timeout(&self) -> Duration {
        Duration::from_secs(self.database.timeout)
    }

    /// How long edits to a command message re-run the command
    #[must_use]
    pub const fn edit_age(&self) -> Duration {
        Duration::from_secs(self.edit_age)
    }

    /// Fails if the configuration cannot start the bot.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(Error::Config {
                message: "No bot token configured (bot_token or LEVIN_BOT_TOKEN)".to_string(),
            });
        }
        if self.owners.contains(&0) {
            return Err(Error::Config {
                message: "Owner ids must not be 0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e| Error::Config {
        message: format!("Invalid value for {name}: {e}"),
    })
}

/// Finds the configuration file to read.
///
/// An explicit path must exist. Otherwise the standard locations are searched
/// and `None` is returned when none holds a config file.
pub fn find_config_file(explicit: Option<&Path>, config_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::Config {
                message: format!("Config file {} does not exist", path.display()),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    let mut candidates = vec![
        PathBuf::from(CONFIG_FILE_NAME),
        Path::new("config").join(CONFIG_FILE_NAME),
    ];
    if let Some(dir) = config_dir {
        candidates.push(dir.join(CONFIG_FILE_NAME));
    }
    Ok(candidates.into_iter().find(|path| path.is_file()))
}

/// Loads the application configuration from file and process environment.
pub fn load_app_configuration(explicit: Option<&Path>) -> Result<AppConfig> {
    let config_dir = std::env::var_os("CONFIG_DIR").map(PathBuf::from);
    let mut config = match find_config_file(explicit, config_dir.as_deref())? {
        Some(path) => {
            debug!(path = %path.display(), "Reading configuration file");
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::Config {
                message: format!("Failed to read config file {}: {e}", path.display()),
            })?;
            AppConfig::from_toml_str(&contents)?
        }
        None => {
            debug!("No configuration file found, using defaults and environment");
            AppConfig::default()
        }
    };

    config.apply_env(|name| std::env::var(name).ok())?;
    config.validate()?;
    debug!(config = ?config, "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono_tz::Tz;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
            bot_token = "abc"
            owners = [1, 2]
            default_prefix = "!"
            default_language = "de"
            default_time_zone = "Europe/Berlin"
            activity = "Watching the settings"
            edit_age = 30
            allow_bot = true

            [database]
            url = "sqlite://levin.sqlite?mode=rwc"
            timeout = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.owners, vec![1, 2]);
        assert_eq!(config.edit_age(), Duration::from_secs(30));
        assert!(config.allow_bot);
        assert_eq!(config.database.url.as_deref(), Some("sqlite://levin.sqlite?mode=rwc"));
        assert_eq!(config.database_timeout(), Duration::from_secs(3));
        assert!(config.validate().is_ok());

        let defaults = config.defaults();
        assert_eq!(defaults.prefixes(), ["!".to_string()]);
        assert_eq!(defaults.language(), "de");
        assert_eq!(defaults.time_zone(), Tz::Europe__Berlin);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.edit_age, 15);
        assert_eq!(config.database.timeout, 5);
        assert!(config.database.url.is_none());

        let defaults = config.defaults();
        assert!(defaults.prefixes().is_empty());
        assert_eq!(defaults.language(), "en");
        assert_eq!(defaults.time_zone(), Tz::UTC);
    }

    #[test]
    fn test_invalid_defaults_are_normalized() {
        let config = AppConfig {
            default_language: "not a language".to_string(),
            default_time_zone: "Moon/Base".to_string(),
            ..AppConfig::default()
        };
        let defaults = config.defaults();
        assert_eq!(defaults.language(), "en");
        assert_eq!(defaults.time_zone(), Tz::UTC);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = AppConfig::from_toml_str("bot_token = \"file\"\nedit_age = 3").unwrap();
        config
            .apply_env(env(&[
                ("LEVIN_BOT_TOKEN", "env"),
                ("LEVIN_OWNERS", "10, 20"),
                ("LEVIN_DEFAULT_LANG", "de-de"),
                ("LEVIN_DEFAULT_TIME_ZONE", "Asia/Tokyo"),
                ("LEVIN_ALLOW_BOT", "true"),
                ("DATABASE_URL", "sqlite::memory:"),
                ("LEVIN_DATABASE_TIMEOUT", "9"),
            ]))
            .unwrap();

        assert_eq!(config.bot_token, "env");
        assert_eq!(config.owners, vec![10, 20]);
        assert_eq!(config.edit_age, 3);
        assert!(config.allow_bot);
        assert_eq!(config.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.database.timeout, 9);
        assert_eq!(config.defaults().language(), "de-DE");
        assert_eq!(config.defaults().time_zone(), Tz::Asia__Tokyo);
    }

    #[test]
    fn test_levin_database_url_wins_over_generic() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("LEVIN_DATABASE_URL", "sqlite://a.sqlite"),
                ("DATABASE_URL", "sqlite://b.sqlite"),
            ]))
            .unwrap();
        assert_eq!(config.database.url.as_deref(), Some("sqlite://a.sqlite"));
    }

    #[test]
    fn test_invalid_env_values_are_errors() {
        let mut config = AppConfig::default();
        assert!(config.apply_env(env(&[("LEVIN_EDIT_AGE", "soon")])).is_err());
        assert!(config.apply_env(env(&[("LEVIN_OWNERS", "1,x")])).is_err());
    }

    #[test]
    fn test_validate_requires_token() {
        assert!(matches!(AppConfig::default().validate(), Err(Error::Config { .. })));
        let config = AppConfig {
            bot_token: "t".to_string(),
            owners: vec![0],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = AppConfig {
            bot_token: "secret-token".to_string(),
            ..AppConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret-token"));
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(find_config_file(Some(missing.as_path()), None).is_err());

        let in_config_dir = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&in_config_dir, "").unwrap();
        assert_eq!(
            find_config_file(Some(in_config_dir.as_path()), None).unwrap(),
            Some(in_config_dir.clone())
        );
        assert_eq!(
            find_config_file(None, Some(dir.path())).unwrap(),
            Some(in_config_dir)
        );
    }
}
