#![allow(clippy::result_large_err)]

use clap::Parser;
use dotenvy::dotenv;
use levin::{
    bot::{self, BotData},
    config::{self, database},
    core::{
        DatabaseRepository, MemoryRepository, SettingsRepository,
        i18n::Translations,
        provider::TracingReporter,
    },
    errors::Result,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Levin - Discord bot with per-guild settings
#[derive(Debug, Parser)]
#[command(name = "levin", version)]
struct Cli {
    /// Debug logging with human-readable output
    #[arg(long)]
    debug: bool,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize tracing (as early as possible)
    init_tracing(cli.debug);

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration(cli.config.as_deref())
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;
    info!("Successfully processed application configuration.");

    // 4. Load translations
    let translations = Arc::new(
        Translations::load(app_config.translations_path.as_deref())
            .inspect_err(|e| error!("Failed to load translations: {e}"))?,
    );
    info!(languages = ?translations.language_tags(), "Translations loaded");

    // 5. Set up the settings repository
    let defaults = Arc::new(app_config.defaults());
    let repository: Arc<dyn SettingsRepository> = match app_config.database.url.as_deref() {
        Some(url) => {
            let db = database::create_connection(url, app_config.database_timeout())
                .await
                .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
            database::create_tables(&db).await?;
            let repository =
                DatabaseRepository::new(db, defaults, app_config.database_timeout());
            repository.ping().await?;
            info!("Database initialized successfully.");
            Arc::new(repository)
        }
        None => {
            warn!("No database configured, settings are kept in memory only");
            Arc::new(MemoryRepository::new(defaults))
        }
    };

    // 6. Run the bot
    let data = BotData::new(repository, translations, Arc::new(TracingReporter));
    bot::run_bot(&app_config, data).await
}

/// `RUST_LOG` wins; otherwise `--debug` logs this crate at debug level in
/// pretty format and the default is compact info-level output without colors.
fn init_tracing(debug: bool) {
    let fallback = if debug { "info,levin=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .with_ansi(false)
            .init();
    }
}
