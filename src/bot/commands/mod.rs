//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Bot-master management commands
pub mod botmaster;

/// General utility commands
pub mod general;

/// Prefix, language and time zone commands
pub mod settings;

use crate::bot::BotData;
use crate::errors::Error;

// Export commands
pub use botmaster::*;
pub use general::*;
pub use settings::*;

/// Every command the bot registers
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        prefix(),
        clearprefix(),
        language(),
        timezone(),
        botmaster(),
    ]
}

/// Lowercased names and aliases that invoke `commands` at the top level
#[must_use]
pub fn invocation_names(commands: &[poise::Command<BotData, Error>]) -> Vec<String> {
    commands
        .iter()
        .flat_map(|command| std::iter::once(&command.name).chain(&command.aliases))
        .map(|name| name.to_lowercase())
        .collect()
}
