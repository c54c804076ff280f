//! Settings records and the defaults used to materialize them.
//!
//! Every guild and every user has exactly one settings record. Records are
//! created lazily from [`Defaults`] the first time they are looked up, so a
//! record handed to a caller never carries an empty language.

use chrono_tz::Tz;
use tracing::warn;

/// Language used when no default language is configured
pub const FALLBACK_LANGUAGE: &str = "en";

/// Per-guild settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuildSettings {
    /// Prefixes that invoke commands; empty means mentions only
    pub prefixes: Vec<String>,
    /// Normalized BCP 47 language tag
    pub language: String,
    /// Time zone used when formatting or parsing times
    pub time_zone: Tz,
    /// Users granted bot-master status
    pub bot_master_user_ids: Vec<u64>,
    /// Roles whose members have bot-master status
    pub bot_master_role_ids: Vec<u64>,
}

impl GuildSettings {
    /// Whether the user, holding the passed roles, is listed as a bot master.
    ///
    /// Administrators are bot masters as well; that part depends on Discord
    /// permissions and is checked by the bot layer.
    #[must_use]
    pub fn lists_bot_master(&self, user_id: u64, role_ids: &[u64]) -> bool {
        self.bot_master_user_ids.contains(&user_id)
            || role_ids
                .iter()
                .any(|role_id| self.bot_master_role_ids.contains(role_id))
    }
}

/// Per-user settings, used for direct messages
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSettings {
    /// Normalized BCP 47 language tag
    pub language: String,
    /// Time zone used when formatting or parsing times
    pub time_zone: Tz,
}

/// Values applied to guilds and users without stored settings.
///
/// Immutable once built; construction normalizes an empty language to
/// [`FALLBACK_LANGUAGE`] and a missing time zone to UTC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Defaults {
    prefixes: Vec<String>,
    language: String,
    time_zone: Tz,
}

impl Defaults {
    /// Creates normalized defaults.
    #[must_use]
    pub fn new(prefixes: Vec<String>, language: impl Into<String>, time_zone: Option<Tz>) -> Self {
        let mut language = language.into();
        if language.trim().is_empty() {
            language = FALLBACK_LANGUAGE.to_string();
        }

        Self {
            prefixes: prefixes.into_iter().filter(|p| !p.is_empty()).collect(),
            language,
            time_zone: time_zone.unwrap_or(Tz::UTC),
        }
    }

    /// Default prefixes for new guilds
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Default language for new guilds and users
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Default time zone for new guilds and users
    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// A fresh guild record holding only defaults
    #[must_use]
    pub fn guild_settings(&self) -> GuildSettings {
        GuildSettings {
            prefixes: self.prefixes.clone(),
            language: self.language.clone(),
            time_zone: self.time_zone,
            bot_master_user_ids: Vec::new(),
            bot_master_role_ids: Vec::new(),
        }
    }

    /// A fresh user record holding only defaults
    #[must_use]
    pub fn user_settings(&self) -> UserSettings {
        UserSettings {
            language: self.language.clone(),
            time_zone: self.time_zone,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::new(Vec::new(), FALLBACK_LANGUAGE, None)
    }
}

/// Parses an IANA zone name, returning `None` for unknown names.
#[must_use]
pub fn parse_time_zone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Resolves a stored zone name, falling back to UTC for names the zone
/// database no longer knows.
#[must_use]
pub fn stored_time_zone(name: &str) -> Tz {
    parse_time_zone(name).unwrap_or_else(|| {
        warn!(time_zone = name, "Stored time zone is unknown, using UTC");
        Tz::UTC
    })
}

/// Rejects ids that can never belong to a Discord entity.
pub(crate) fn check_id(id: u64, entity: &'static str) -> crate::errors::Result<u64> {
    if id == 0 {
        return Err(crate::errors::Error::InvalidIdentifier { entity });
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_zero_values() {
        let defaults = Defaults::new(Vec::new(), "", None);
        assert_eq!(defaults.language(), "en");
        assert_eq!(defaults.time_zone(), Tz::UTC);
        assert!(defaults.prefixes().is_empty());
    }

    #[test]
    fn test_defaults_keep_configured_values() {
        let defaults = Defaults::new(vec!["!".into(), String::new()], "de", Some(Tz::Europe__Berlin));
        assert_eq!(defaults.prefixes(), ["!".to_string()]);
        assert_eq!(defaults.language(), "de");

        let guild = defaults.guild_settings();
        assert_eq!(guild.prefixes, vec!["!".to_string()]);
        assert_eq!(guild.time_zone, Tz::Europe__Berlin);
        assert!(guild.bot_master_user_ids.is_empty());

        let user = defaults.user_settings();
        assert_eq!(user.language, "de");
    }

    #[test]
    fn test_lists_bot_master() {
        let mut guild = Defaults::default().guild_settings();
        guild.bot_master_user_ids = vec![7];
        guild.bot_master_role_ids = vec![100, 200];

        assert!(guild.lists_bot_master(7, &[]));
        assert!(guild.lists_bot_master(8, &[1, 200]));
        assert!(!guild.lists_bot_master(8, &[1, 2]));
    }

    #[test]
    fn test_stored_time_zone_falls_back_to_utc() {
        assert_eq!(stored_time_zone("Europe/Berlin"), Tz::Europe__Berlin);
        assert_eq!(stored_time_zone("Mars/Olympus_Mons"), Tz::UTC);
        assert_eq!(parse_time_zone("Nowhere"), None);
    }

    #[test]
    fn test_check_id_rejects_zero() {
        assert!(check_id(0, "guild").is_err());
        assert_eq!(check_id(42, "guild").ok(), Some(42));
    }
}
