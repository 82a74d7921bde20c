//! Environment configuration loader.
//!
//! Reads the bot's configuration from environment variables once at
//! startup. Required variables fail loudly; the commerce host/port have
//! the Strapi development defaults.

use secrecy::SecretString;
use thiserror::Error;

use fishcart_types::config::BotConfig;

use crate::sqlite::pool::default_database_url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {message}")]
    InvalidVar {
        var: &'static str,
        message: String,
    },
}

/// Load [`BotConfig`] from the environment.
///
/// - `API_TOKEN` (required): Strapi bearer token.
/// - `HOST` (default `localhost`), `PORT` (default `1337`): commerce backend.
/// - `TG_TOKEN` (required): Telegram bot credential.
/// - `DATABASE_URL` (default `sqlite://{FISHCART_DATA_DIR or ~/.fishcart}/fishcart.db`).
pub fn load_config() -> Result<BotConfig, ConfigError> {
    let api_token = required("API_TOKEN")?;
    let tg_token = required("TG_TOKEN")?;

    let host = std::env::var("HOST").unwrap_or_else(|_| "localhost".to_string());
    let port_raw = std::env::var("PORT").unwrap_or_else(|_| "1337".to_string());
    let port: u16 = port_raw.parse().map_err(|_| ConfigError::InvalidVar {
        var: "PORT",
        message: format!("'{port_raw}' is not a port number"),
    })?;

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| default_database_url());

    Ok(BotConfig {
        api_token: SecretString::from(api_token),
        host,
        port,
        tg_token: SecretString::from(tg_token),
        database_url,
    })
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}
