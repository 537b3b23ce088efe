use std::str::FromStr;

use async_graphql::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::{LodgeError, LodgeResult};

/// Opens the lodge database and brings its schema up to date.
pub async fn connect(config: &Config) -> LodgeResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|err| LodgeError::Config(format!("Invalid DATABASE_URL: {}", err)))?
        .create_if_missing(true)
        .foreign_keys(true);

    // an in-memory database only lives as long as its one connection
    let pool = if config.database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?
    };

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::debug!(url = %config.database_url, "database ready");

    Ok(pool)
}

pub fn pool_from_ctx<'c>(ctx: &Context<'c>) -> &'c SqlitePool {
    ctx.data_unchecked::<SqlitePool>()
}
