//! Bot-master management - who besides administrators may change guild
//! settings.

use crate::core::settings::GuildSettings;

/// A user or role that can be granted bot-master status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// A single user
    User(u64),
    /// Every member holding the role
    Role(u64),
}

impl Target {
    /// Discord mention markup for the target
    #[must_use]
    pub fn mention(self) -> String {
        match self {
            Self::User(id) => format!("<@{id}>"),
            Self::Role(id) => format!("<@&{id}>"),
        }
    }

    /// Lists the target; `false` if it already was.
    pub fn add_to(self, settings: &mut GuildSettings) -> bool {
        let (ids, id) = self.ids_in(settings);
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        true
    }

    /// Unlists the target; `false` if it was not listed.
    pub fn remove_from(self, settings: &mut GuildSettings) -> bool {
        let (ids, id) = self.ids_in(settings);
        let before = ids.len();
        ids.retain(|listed| *listed != id);
        ids.len() != before
    }

    fn ids_in(self, settings: &mut GuildSettings) -> (&mut Vec<u64>, u64) {
        match self {
            Self::User(id) => (&mut settings.bot_master_user_ids, id),
            Self::Role(id) => (&mut settings.bot_master_role_ids, id),
        }
    }
}

/// Mentions of all listed bot masters, users first.
#[must_use]
pub fn listed_masters(settings: &GuildSettings) -> Vec<String> {
    settings
        .bot_master_user_ids
        .iter()
        .map(|id| Target::User(*id))
        .chain(settings.bot_master_role_ids.iter().map(|id| Target::Role(*id)))
        .map(Target::mention)
        .collect()
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{Target, listed_masters};
    use crate::{
        bot::{Context, handlers, terms},
        core::i18n::Term,
        errors::Result,
    };
    use poise::serenity_prelude as serenity;

    /// Manages the users and roles that may change settings here.
    #[poise::command(
        slash_command,
        prefix_command,
        guild_only,
        required_permissions = "ADMINISTRATOR",
        subcommands("botmaster_list", "botmaster_add", "botmaster_remove"),
        subcommand_required
    )]
    pub async fn botmaster(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Lists the bot masters of this server.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "list",
        guild_only,
        required_permissions = "ADMINISTRATOR"
    )]
    pub async fn botmaster_list(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let settings = ctx.data().repository.guild_settings(guild_id.get()).await?;
        let localizer = handlers::settings(ctx).await.localizer;

        let masters = listed_masters(&settings);
        let text = if masters.is_empty() {
            localizer.localize(&terms::BOT_MASTER_LIST_EMPTY)
        } else {
            let masters = masters.join(", ");
            localizer.localize_with(&terms::BOT_MASTER_LIST, &[("masters", masters.as_str())])
        };
        say_quietly(ctx, text).await
    }

    /// Grants a user or role bot-master status.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "add",
        guild_only,
        required_permissions = "ADMINISTRATOR"
    )]
    pub async fn botmaster_add(
        ctx: Context<'_>,
        #[description = "User to add"] user: Option<serenity::User>,
        #[description = "Role to add"] role: Option<serenity::Role>,
    ) -> Result<()> {
        edit(ctx, target(user, role), true).await
    }

    /// Revokes bot-master status from a user or role.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "remove",
        guild_only,
        required_permissions = "ADMINISTRATOR"
    )]
    pub async fn botmaster_remove(
        ctx: Context<'_>,
        #[description = "User to remove"] user: Option<serenity::User>,
        #[description = "Role to remove"] role: Option<serenity::Role>,
    ) -> Result<()> {
        edit(ctx, target(user, role), false).await
    }

    fn target(user: Option<serenity::User>, role: Option<serenity::Role>) -> Option<Target> {
        user.map(|user| Target::User(user.id.get()))
            .or_else(|| role.map(|role| Target::Role(role.id.get())))
    }

    async fn edit(ctx: Context<'_>, target: Option<Target>, add: bool) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let localizer = handlers::settings(ctx).await.localizer;
        let Some(target) = target else {
            return say_quietly(ctx, localizer.localize(&terms::BOT_MASTER_MISSING_TARGET)).await;
        };

        let repository = &ctx.data().repository;
        let mut settings = repository.guild_settings(guild_id.get()).await?;
        let changed = if add {
            target.add_to(&mut settings)
        } else {
            target.remove_from(&mut settings)
        };
        if changed {
            repository
                .set_bot_masters(
                    guild_id.get(),
                    settings.bot_master_user_ids,
                    settings.bot_master_role_ids,
                )
                .await?;
        }

        let term: &Term = match (add, changed) {
            (true, true) => &terms::BOT_MASTER_ADDED,
            (true, false) => &terms::BOT_MASTER_ALREADY_LISTED,
            (false, true) => &terms::BOT_MASTER_REMOVED,
            (false, false) => &terms::BOT_MASTER_NOT_LISTED,
        };
        let mention = target.mention();
        say_quietly(ctx, localizer.localize_with(term, &[("target", mention.as_str())])).await
    }

    // mentions are rendered but nobody gets pinged
    async fn say_quietly(ctx: Context<'_>, text: String) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .content(text)
                .allowed_mentions(serenity::CreateAllowedMentions::new()),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Defaults;

    #[test]
    fn test_add_and_remove_targets() {
        let mut settings = Defaults::default().guild_settings();

        assert!(Target::User(7).add_to(&mut settings));
        assert!(!Target::User(7).add_to(&mut settings));
        assert!(Target::Role(9).add_to(&mut settings));
        assert_eq!(settings.bot_master_user_ids, vec![7]);
        assert_eq!(settings.bot_master_role_ids, vec![9]);

        assert!(!Target::Role(7).remove_from(&mut settings));
        assert!(Target::User(7).remove_from(&mut settings));
        assert!(settings.bot_master_user_ids.is_empty());
        assert_eq!(settings.bot_master_role_ids, vec![9]);
    }

    #[test]
    fn test_listed_masters_mentions() {
        let mut settings = Defaults::default().guild_settings();
        assert!(listed_masters(&settings).is_empty());

        settings.bot_master_user_ids = vec![1, 2];
        settings.bot_master_role_ids = vec![3];
        assert_eq!(listed_masters(&settings), vec!["<@1>", "<@2>", "<@&3>"]);
    }
}
