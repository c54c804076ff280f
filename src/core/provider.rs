//! Per-message settings resolution.
//!
//! The bot calls [`resolve`] for every inbound message before a command runs.
//! A failing repository never blocks command handling: the message is
//! processed with no custom prefixes, the fallback localizer and UTC, and the
//! error goes to the [`ErrorReporter`].

use crate::core::i18n::{Localizer, Translations};
use crate::core::repository::SettingsRepository;
use crate::errors::Error;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::error;

/// Receives operational errors that must not interrupt message handling.
pub trait ErrorReporter: Send + Sync {
    /// Records an error; `source` names the component that hit it.
    fn report(&self, source: &'static str, error: &Error);
}

/// Reports errors as structured `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, source: &'static str, error: &Error) {
        error!(err_source = source, error = %error, "Reported error");
    }
}

/// Settings that apply to one inbound message
#[derive(Clone, Debug)]
pub struct ResolvedSettings {
    /// Prefixes that invoke commands here; empty means mentions only
    pub prefixes: Vec<String>,
    /// Localizer for replies
    pub localizer: Localizer,
    /// Time zone of the guild, or of the user in direct messages
    pub time_zone: Tz,
}

impl ResolvedSettings {
    /// The settings used when the repository cannot be consulted.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            prefixes: Vec::new(),
            localizer: Localizer::fallback(),
            time_zone: Tz::UTC,
        }
    }
}

/// Resolves prefixes, localizer and time zone for a message sent by
/// `author_id`, in `guild_id` or in direct messages when `None`.
pub async fn resolve(
    repository: &dyn SettingsRepository,
    translations: &Arc<Translations>,
    reporter: &dyn ErrorReporter,
    guild_id: Option<u64>,
    author_id: u64,
) -> ResolvedSettings {
    match guild_id {
        Some(guild_id) => match repository.guild_settings(guild_id).await {
            Ok(settings) => ResolvedSettings {
                localizer: Localizer::new(Arc::clone(translations), settings.language),
                prefixes: settings.prefixes,
                time_zone: settings.time_zone,
            },
            Err(e) => {
                reporter.report("settings", &e);
                ResolvedSettings::fallback()
            }
        },
        None => match repository.user_settings(author_id).await {
            Ok(settings) => ResolvedSettings {
                prefixes: Vec::new(),
                localizer: Localizer::new(Arc::clone(translations), settings.language),
                time_zone: settings.time_zone,
            },
            Err(e) => {
                reporter.report("settings", &e);
                ResolvedSettings::fallback()
            }
        },
    }
}
