//! Bot-master permission check.

use crate::bot::{Context, handlers, terms};
use crate::errors::Result;

/// Whether the invoking member may change guild settings.
///
/// Bot masters are the listed users, members holding a listed role and
/// members with the Administrator permission. Outside guilds everyone manages
/// their own settings.
pub async fn is_bot_master(ctx: Context<'_>) -> Result<bool> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(true);
    };
    let Some(member) = ctx.author_member().await else {
        return Ok(false);
    };

    let settings = ctx.data().repository.guild_settings(guild_id.get()).await?;
    let role_ids: Vec<u64> = member.roles.iter().map(|role| role.get()).collect();
    if settings.lists_bot_master(member.user.id.get(), &role_ids) {
        return Ok(true);
    }

    #[allow(deprecated)]
    let permissions = member
        .permissions
        .or_else(|| ctx.guild().map(|guild| guild.member_permissions(&member)));
    Ok(permissions.is_some_and(|p| p.administrator()))
}

/// Replies with a localized refusal unless the invoker is a bot master.
///
/// Returns whether the command may go on.
pub async fn ensure_bot_master(ctx: Context<'_>) -> Result<bool> {
    if is_bot_master(ctx).await? {
        return Ok(true);
    }
    let localizer = handlers::settings(ctx).await.localizer;
    ctx.say(localizer.localize_with(&terms::NOT_BOT_MASTER, &[("prefix", ctx.prefix())]))
        .await?;
    Ok(false)
}
