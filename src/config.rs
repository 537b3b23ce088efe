use std::net::SocketAddr;

use time::UtcOffset;

use crate::error::{LodgeError, LodgeResult};
use crate::util::offset_from_hours;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://lodge.db";
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_UTC_OFFSET: i8 = -8;

/// Runtime settings, read from the environment (and a `.env` file, if any).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub address: SocketAddr,
    /// The endpoint the GraphQL playground sends queries to
    pub api_url: String,
    /// The lodge's offset from UTC, used to decide what "today" is
    pub utc_offset: UtcOffset,
}

impl Config {
    pub fn from_env() -> LodgeResult<Self> {
        dotenv::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());
        let address = std::env::var("LODGE_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_ADDRESS.to_owned())
            .parse()
            .map_err(|err| LodgeError::Config(format!("Invalid LODGE_ADDRESS: {}", err)))?;
        let api_url = std::env::var("LODGE_API_URL").unwrap_or_else(|_| "/".to_owned());
        let utc_offset = match std::env::var("LODGE_UTC_OFFSET") {
            Ok(hours) => offset_from_hours(hours.parse().map_err(|err| {
                LodgeError::Config(format!("Invalid LODGE_UTC_OFFSET {}: {}", hours, err))
            })?)?,
            Err(_) => offset_from_hours(DEFAULT_UTC_OFFSET)?,
        };

        Ok(Self {
            database_url,
            address,
            api_url,
            utc_offset,
        })
    }

    /// Settings for an in-memory database, used by tests.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_owned(),
            address: SocketAddr::from(([127, 0, 0, 1], 0)),
            api_url: "/".to_owned(),
            utc_offset: UtcOffset::UTC,
        }
    }
}
