//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the settings repository into poise: prefixes are
//! resolved per message, replies are localized in the guild's (or, in direct
//! messages, the user's) language, and commands change the stored settings.

/// Discord command implementations (general, settings, bot masters)
pub mod commands;
/// Framework hooks: prefix resolution, permission checks, error replies
pub mod handlers;
/// Localized messages
pub mod terms;

use crate::config::{AppConfig, presence};
use crate::core::i18n::Translations;
use crate::core::provider::{self, ErrorReporter, ResolvedSettings};
use crate::core::repository::SettingsRepository;
use crate::core::throttle::{LANGUAGE_CHANGES_PER_HOUR, Throttle};
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Poise context used by all commands
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
pub struct BotData {
    /// Guild and user settings
    pub repository: Arc<dyn SettingsRepository>,
    /// Loaded translation catalogs
    pub translations: Arc<Translations>,
    /// Sink for errors that must not interrupt message handling
    pub reporter: Arc<dyn ErrorReporter>,
    /// Limits how often a guild changes its language
    pub language_throttle: Throttle,
    /// Words that start a command in a direct message
    pub command_names: Vec<String>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SettingsRepository>,
        translations: Arc<Translations>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            repository,
            translations,
            reporter,
            language_throttle: Throttle::per_hour(LANGUAGE_CHANGES_PER_HOUR),
            command_names: commands::invocation_names(&commands::all()),
        }
    }

    /// Prefixes of a guild for matching a message.
    ///
    /// Failures are only logged; the invocation that follows resolves its
    /// settings again and reports there, so one message yields one report.
    pub async fn guild_prefixes(&self, guild_id: serenity::GuildId) -> Vec<String> {
        match self.repository.prefixes(guild_id.get()).await {
            Ok(prefixes) => prefixes,
            Err(e) => {
                debug!(guild_id = guild_id.get(), error = %e, "Prefixes unavailable, matching mentions only");
                Vec::new()
            }
        }
    }

    /// Settings for a message from `author_id`, in a guild or a direct message.
    pub async fn resolve(
        &self,
        guild_id: Option<serenity::GuildId>,
        author_id: serenity::UserId,
    ) -> ResolvedSettings {
        provider::resolve(
            self.repository.as_ref(),
            &self.translations,
            self.reporter.as_ref(),
            guild_id.map(serenity::GuildId::get),
            author_id.get(),
        )
        .await
    }
}

/// Builds the framework and client and runs the bot until it is stopped.
#[instrument(skip(config, data))]
pub async fn run_bot(config: &AppConfig, data: BotData) -> Result<()> {
    let options = poise::FrameworkOptions {
        commands: commands::all(),
        prefix_options: poise::PrefixFrameworkOptions {
            stripped_dynamic_prefix: Some(handlers::prefix::strip_prefix),
            mention_as_prefix: true,
            edit_tracker: Some(Arc::new(poise::EditTracker::for_timespan(
                config.edit_age(),
            ))),
            ignore_bots: !config.allow_bot,
            ..Default::default()
        },
        owners: config
            .owners
            .iter()
            .filter(|id| **id != 0)
            .map(|id| serenity::UserId::new(*id))
            .collect(),
        pre_command: |ctx| Box::pin(handlers::pre_command(ctx)),
        on_error: |error| Box::pin(handlers::errors::on_error(error)),
        ..Default::default()
    };

    let framework = poise::Framework::builder()
        .options(options)
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut builder = serenity::ClientBuilder::new(&config.bot_token, intents)
        .framework(framework)
        .status(presence::parse_status(&config.status));
    if let Some(activity) = presence::parse_activity(&config.activity, config.activity_url.as_deref()) {
        builder = builder.activity(activity);
    }

    info!("Setting up Serenity client for Poise framework...");
    let mut client = builder
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::DatabaseRepository;
    use crate::core::database::DEFAULT_TIMEOUT;
    use crate::test_utils::{RecordingReporter, drop_table, setup_test_db, test_defaults};

    async fn data_with_outage() -> (BotData, Arc<RecordingReporter>) {
        let db = setup_test_db().await.unwrap();
        drop_table(&db, "guild_settings").await.unwrap();
        let repository = DatabaseRepository::new(db, Arc::new(test_defaults()), DEFAULT_TIMEOUT);
        let reporter = Arc::new(RecordingReporter::default());
        let data = BotData::new(
            Arc::new(repository),
            Arc::new(Translations::embedded().unwrap()),
            Arc::clone(&reporter) as Arc<dyn ErrorReporter>,
        );
        (data, reporter)
    }

    #[tokio::test]
    async fn test_prefix_lookup_does_not_report() {
        let (data, reporter) = data_with_outage().await;

        let prefixes = data.guild_prefixes(serenity::GuildId::new(42)).await;
        assert!(prefixes.is_empty());
        assert!(reporter.reports().is_empty());

        // the invocation itself reports once
        data.resolve(Some(serenity::GuildId::new(42)), serenity::UserId::new(7))
            .await;
        assert_eq!(reporter.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_new_collects_command_names() {
        let (data, _) = data_with_outage().await;
        assert!(data.command_names.iter().any(|n| n == "lang"));
        assert!(data.language_throttle.check(1).is_ok());
    }
}
