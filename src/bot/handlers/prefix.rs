//! Dynamic per-guild prefixes.
//!
//! Guild messages are matched against the guild's stored prefixes (mentions
//! are handled by poise itself). Direct messages have no prefix at all; a
//! message there invokes a command when its first word names one.

use crate::bot::BotData;
use crate::errors::Error;
use poise::serenity_prelude as serenity;

/// `stripped_dynamic_prefix` hook: splits the message into prefix and rest.
pub fn strip_prefix<'a>(
    _ctx: &'a serenity::Context,
    msg: &'a serenity::Message,
    data: &'a BotData,
) -> poise::BoxFuture<'a, Result<Option<(&'a str, &'a str)>, Error>> {
    Box::pin(async move {
        let Some(guild_id) = msg.guild_id else {
            return Ok(dm_invocation(&msg.content, &data.command_names));
        };
        let prefixes = data.guild_prefixes(guild_id).await;
        Ok(match_prefix(&msg.content, &prefixes))
    })
}

/// Treats a direct message as an invocation if its first word is one of
/// `names` (lowercase), ignoring case.
#[must_use]
pub fn dm_invocation<'a>(content: &'a str, names: &[String]) -> Option<(&'a str, &'a str)> {
    let first = content.split_whitespace().next()?.to_lowercase();
    names
        .iter()
        .any(|name| *name == first)
        .then(|| content.split_at(0))
}

/// Finds the longest of `prefixes` that starts `content`.
#[must_use]
pub fn match_prefix<'a>(content: &'a str, prefixes: &[String]) -> Option<(&'a str, &'a str)> {
    prefixes
        .iter()
        .filter(|prefix| !prefix.is_empty() && content.starts_with(prefix.as_str()))
        .max_by_key(|prefix| prefix.len())
        .map(|prefix| content.split_at(prefix.len()))
}
