//! Settings commands - prefix, language and time zone.
//!
//! Reading a setting is open to everyone. Changing a guild setting requires
//! bot-master status; in direct messages users change their own settings.

use crate::errors::{Error, Result};

/// Checks a prefix typed by a user.
pub fn validate_prefix(raw: &str) -> Result<&str> {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return Err(Error::InvalidPrefix {
            prefix: raw.to_string(),
        });
    }
    Ok(raw)
}

/// Renders values as a comma separated list of code spans.
#[must_use]
pub fn code_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|value| format!("`{}`", value.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{code_list, validate_prefix};
    use crate::{
        bot::{
            Context,
            handlers::{self, checks},
            terms,
        },
        core::{
            i18n::{Localizer, normalize_language_tag},
            settings::{FALLBACK_LANGUAGE, parse_time_zone},
        },
        errors::{Error, Result},
    };
    use std::sync::Arc;

    /// Shows or changes the command prefix of this server.
    #[poise::command(slash_command, prefix_command, guild_only)]
    pub async fn prefix(
        ctx: Context<'_>,
        #[description = "New prefix, without spaces"] new_prefix: Option<String>,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let resolved = handlers::settings(ctx).await;
        let localizer = resolved.localizer;

        let Some(new_prefix) = new_prefix else {
            let reply = if resolved.prefixes.is_empty() {
                localizer.localize(&terms::PREFIX_SHOW_MENTION_ONLY)
            } else {
                let prefixes = code_list(&resolved.prefixes);
                localizer.localize_with(&terms::PREFIX_SHOW, &[("prefixes", prefixes.as_str())])
            };
            ctx.say(reply).await?;
            return Ok(());
        };

        if !checks::ensure_bot_master(ctx).await? {
            return Ok(());
        }
        let new_prefix = validate_prefix(&new_prefix)?;
        ctx.data()
            .repository
            .set_prefix(guild_id.get(), new_prefix)
            .await?;
        ctx.say(localizer.localize_with(&terms::PREFIX_CHANGED, &[("prefix", new_prefix)]))
            .await?;
        Ok(())
    }

    /// Removes the prefix so that only mentions invoke commands.
    #[poise::command(slash_command, prefix_command, guild_only)]
    pub async fn clearprefix(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        if !checks::ensure_bot_master(ctx).await? {
            return Ok(());
        }
        ctx.data().repository.set_prefix(guild_id.get(), "").await?;

        let localizer = handlers::settings(ctx).await.localizer;
        ctx.say(localizer.localize(&terms::PREFIX_CLEARED)).await?;
        Ok(())
    }

    /// Lists the available languages or changes the language.
    ///
    /// In a server this changes the server language, in direct messages your
    /// own. A server can change its language seven times per hour.
    #[poise::command(slash_command, prefix_command, aliases("lang"))]
    pub async fn language(
        ctx: Context<'_>,
        #[description = "Language tag, e.g. en or de"] new_language: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let localizer = handlers::settings(ctx).await.localizer;

        let Some(raw) = new_language else {
            let current = localizer.language().unwrap_or(FALLBACK_LANGUAGE);
            let languages = code_list(&data.translations.language_tags());
            ctx.say(localizer.localize_with(
                &terms::LANGUAGE_LIST,
                &[("language", current), ("languages", languages.as_str())],
            ))
            .await?;
            return Ok(());
        };

        let tag = normalize_language_tag(&raw)
            .filter(|tag| data.translations.supports(tag))
            .ok_or_else(|| Error::UnknownLanguage { raw: raw.clone() })?;

        match ctx.guild_id() {
            Some(guild_id) => {
                if !checks::ensure_bot_master(ctx).await? {
                    return Ok(());
                }
                if let Err(remaining) = data.language_throttle.check(guild_id.get()) {
                    let reply = handlers::errors::cooldown_message(&localizer, remaining);
                    ctx.say(reply).await?;
                    return Ok(());
                }
                data.repository
                    .set_guild_language(guild_id.get(), &tag)
                    .await?;
            }
            None => {
                data.repository
                    .set_user_language(ctx.author().id.get(), &tag)
                    .await?;
            }
        }

        let localizer = Localizer::new(Arc::clone(&data.translations), tag);
        ctx.say(localizer.localize(&terms::LANGUAGE_CHANGED)).await?;
        Ok(())
    }

    /// Shows or changes the time zone.
    ///
    /// In a server this changes the server time zone, in direct messages your
    /// own.
    #[poise::command(slash_command, prefix_command, aliases("tz"))]
    pub async fn timezone(
        ctx: Context<'_>,
        #[description = "IANA time zone, e.g. Europe/Berlin"] zone: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let resolved = handlers::settings(ctx).await;
        let localizer = resolved.localizer;

        let Some(raw) = zone else {
            let time = chrono::Utc::now()
                .with_timezone(&resolved.time_zone)
                .format("%H:%M")
                .to_string();
            ctx.say(localizer.localize_with(
                &terms::TIME_ZONE_SHOW,
                &[("time_zone", resolved.time_zone.name()), ("time", time.as_str())],
            ))
            .await?;
            return Ok(());
        };

        let time_zone =
            parse_time_zone(&raw).ok_or_else(|| Error::UnknownTimeZone { raw: raw.clone() })?;

        match ctx.guild_id() {
            Some(guild_id) => {
                if !checks::ensure_bot_master(ctx).await? {
                    return Ok(());
                }
                data.repository
                    .set_guild_time_zone(guild_id.get(), time_zone)
                    .await?;
            }
            None => {
                data.repository
                    .set_user_time_zone(ctx.author().id.get(), time_zone)
                    .await?;
            }
        }

        ctx.say(localizer.localize_with(
            &terms::TIME_ZONE_CHANGED,
            &[("time_zone", time_zone.name())],
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
