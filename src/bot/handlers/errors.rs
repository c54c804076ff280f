//! Framework error handling.
//!
//! Validation errors are answered with a localized explanation. Every other
//! command error goes to the error reporter and the user gets a generic
//! localized message.

use crate::bot::{BotData, Context, handlers, terms};
use crate::core::i18n::Localizer;
use crate::errors::Error;
use std::time::Duration;
use tracing::error;

/// `on_error` hook of the framework.
pub async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let localizer = handlers::settings(ctx).await.localizer;
            if !error.is_user_facing() {
                error!(command = %ctx.command().qualified_name, "Command failed: {error}");
                ctx.data().reporter.report("command", &error);
            }
            reply(ctx, command_error_message(&localizer, &error, ctx.prefix())).await;
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            let localizer = handlers::settings(ctx).await.localizer;
            reply(ctx, localizer.localize(&terms::GUILD_ONLY)).await;
        }
        poise::FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let localizer = handlers::settings(ctx).await.localizer;
            reply(ctx, cooldown_message(&localizer, remaining_cooldown)).await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

async fn reply(ctx: Context<'_>, text: String) {
    if let Err(e) = ctx.say(text).await {
        error!("Failed to send error message: {e}");
    }
}

/// The reply for an error returned by a command invoked with `prefix`.
#[must_use]
pub fn command_error_message(localizer: &Localizer, error: &Error, prefix: &str) -> String {
    match error {
        Error::UnknownLanguage { raw } => {
            let invoke = format!("{prefix}language");
            localizer.localize_with(
                &terms::LANGUAGE_UNKNOWN,
                &[("language", raw.as_str()), ("invoke", invoke.as_str())],
            )
        }
        Error::InvalidPrefix { prefix } => {
            localizer.localize_with(&terms::PREFIX_INVALID, &[("prefix", prefix.as_str())])
        }
        Error::UnknownTimeZone { raw } => {
            localizer.localize_with(&terms::TIME_ZONE_UNKNOWN, &[("time_zone", raw.as_str())])
        }
        _ => localizer.localize(&terms::INTERNAL_ERROR),
    }
}

/// Tells the user to wait `remaining`, in whole seconds rounded up.
#[must_use]
pub fn cooldown_message(localizer: &Localizer, remaining: Duration) -> String {
    let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    let seconds = seconds.max(1).to_string();
    localizer.localize_with(&terms::COOLDOWN, &[("seconds", seconds.as_str())])
}
