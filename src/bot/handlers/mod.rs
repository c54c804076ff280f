//! Framework hooks
//!
//! Prefix resolution, the bot-master check and error replies, plus the
//! pre-command hook that resolves the settings of each invocation once.

/// Bot-master permission check
pub mod checks;
/// Framework error handling
pub mod errors;
/// Dynamic per-guild prefixes
pub mod prefix;

use crate::bot::Context;
use crate::core::provider::ResolvedSettings;
use tracing::info;

/// Resolves the invocation's settings and logs the invocation.
pub async fn pre_command(ctx: Context<'_>) {
    let resolved = ctx.data().resolve(ctx.guild_id(), ctx.author().id).await;
    info!(
        command = %ctx.command().qualified_name,
        guild_id = ?ctx.guild_id().map(|id| id.get()),
        channel_id = ctx.channel_id().get(),
        invoker_id = ctx.author().id.get(),
        language = resolved.localizer.language().unwrap_or("fallback"),
        "Received invoke"
    );
    ctx.set_invocation_data(resolved).await;
}

/// Settings of the current invocation.
///
/// Uses what `pre_command` stored and resolves again when it has not run,
/// e.g. for errors raised before the command started.
pub async fn settings(ctx: Context<'_>) -> ResolvedSettings {
    if let Some(resolved) = ctx.invocation_data::<ResolvedSettings>().await {
        return resolved.clone();
    }
    ctx.data().resolve(ctx.guild_id(), ctx.author().id).await
}
