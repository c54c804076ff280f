//! Unified error types and result handling.
//!
//! Storage failures carry the name of the repository operation that failed so
//! reports are actionable without a backtrace. Validation errors raised from
//! user input are kept apart from operational ones: the former are answered in
//! the channel, the latter are forwarded to the error reporter.

use std::time::Duration;
use thiserror::Error;

/// All errors the bot can produce
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is incomplete
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A zero or otherwise unusable guild/user id was passed to a repository
    #[error("Invalid {entity} id")]
    InvalidIdentifier {
        /// Either `"guild"` or `"user"`
        entity: &'static str,
    },

    /// The settings store could not be reached or rejected the statement
    #[error("Storage unavailable during {operation}: {source}")]
    StorageUnavailable {
        /// Repository operation that issued the statement
        operation: &'static str,
        /// Driver error
        #[source]
        source: sea_orm::DbErr,
    },

    /// A stored record could not be decoded into settings
    #[error("Failed to decode stored settings during {operation}: {message}")]
    StorageDecodeFailure {
        /// Repository operation that read the record
        operation: &'static str,
        /// Decoder message
        message: String,
    },

    /// The settings store did not answer in time
    #[error("Storage did not respond within {timeout:?} during {operation}")]
    StorageTimeout {
        /// Repository operation that timed out
        operation: &'static str,
        /// Configured bound
        timeout: Duration,
    },

    /// A language tag that no loaded translation catalog provides
    #[error("Unknown language: {raw}")]
    UnknownLanguage {
        /// The tag as typed by the user
        raw: String,
    },

    /// A prefix that cannot be used to invoke commands
    #[error("Invalid prefix: {prefix:?}")]
    InvalidPrefix {
        /// The rejected prefix
        prefix: String,
    },

    /// A time zone name missing from the IANA database
    #[error("Unknown time zone: {raw}")]
    UnknownTimeZone {
        /// The name as typed by the user
        raw: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Wraps a driver error, separating decode failures from connectivity ones.
    #[must_use]
    pub fn storage(operation: &'static str, source: sea_orm::DbErr) -> Self {
        match source {
            sea_orm::DbErr::Type(message) | sea_orm::DbErr::Json(message) => {
                Self::StorageDecodeFailure { operation, message }
            }
            source => Self::StorageUnavailable { operation, source },
        }
    }

    /// Whether the error stems from user input and should be answered rather
    /// than reported.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::UnknownLanguage { .. } | Self::InvalidPrefix { .. } | Self::UnknownTimeZone { .. }
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
