//! Database configuration module.
//!
//! Connects to the settings database and creates the settings tables from the
//! entity definitions. `SeaORM`'s `Schema::create_table_from_entity` keeps the
//! schema in lockstep with the Rust structs, so no hand-written SQL is needed.

use crate::entities::{GuildSettings, UserSettings};
use crate::errors::{Error, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::{debug, info};

/// Establishes a connection pool for the passed URL.
///
/// Connecting and acquiring pooled connections are both bounded by `timeout`,
/// so an unreachable database fails start-up instead of hanging it.
pub async fn create_connection(database_url: &str, timeout: Duration) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);
    // every pooled connection would otherwise open its own empty database
    if database_url.contains(":memory:") {
        options.max_connections(1);
    }

    debug!("Connecting to settings database");
    Database::connect(options)
        .await
        .map_err(|source| Error::storage("connect", source))
}

/// Creates the settings tables unless they exist already.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut guild_table = schema.create_table_from_entity(GuildSettings);
    guild_table.if_not_exists();
    let mut user_table = schema.create_table_from_entity(UserSettings);
    user_table.if_not_exists();

    db.execute(builder.build(&guild_table))
        .await
        .map_err(|source| Error::storage("create_tables", source))?;
    db.execute(builder.build(&user_table))
        .await
        .map_err(|source| Error::storage("create_tables", source))?;

    info!("Settings tables are ready");
    Ok(())
}
