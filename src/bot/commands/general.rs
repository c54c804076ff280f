//! General Discord commands - ping and help.
//! These commands don't touch the settings store beyond the localizer that
//! was resolved for the invocation.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers, terms},
        errors::Result,
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        let localizer = handlers::settings(ctx).await.localizer;
        ctx.say(localizer.localize(&terms::PONG)).await?;
        Ok(())
    }

    /// Displays help information about available commands.
    ///
    /// The summary is localized and shows the prefix the command was invoked
    /// with.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let localizer = handlers::settings(ctx).await.localizer;
        ctx.say(localizer.localize_with(&terms::HELP, &[("prefix", ctx.prefix())]))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
