//! Runtime configuration.
//!
//! Loaded once from the environment at startup (see `fishcart-infra`) and
//! passed explicitly to whatever needs it. Credentials are wrapped in
//! [`SecretString`] so they never appear in Debug output or logs.

use secrecy::SecretString;

/// Everything the bot needs to run.
#[derive(Clone)]
pub struct BotConfig {
    /// Strapi bearer token (`API_TOKEN`).
    pub api_token: SecretString,
    /// Commerce backend host (`HOST`, default `localhost`).
    pub host: String,
    /// Commerce backend port (`PORT`, default `1337`).
    pub port: u16,
    /// Telegram bot credential (`TG_TOKEN`).
    pub tg_token: SecretString,
    /// Session store URL (`DATABASE_URL`, default under the data dir).
    pub database_url: String,
}

impl BotConfig {
    /// Base URL of the commerce backend API.
    pub fn commerce_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

// No Debug derive: even with SecretString redaction, the config is only
// ever printed through the `status` command which formats fields itself.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commerce_base_url() {
        let config = BotConfig {
            api_token: SecretString::from("token"),
            host: "localhost".to_string(),
            port: 1337,
            tg_token: SecretString::from("tg"),
            database_url: "sqlite://test.db".to_string(),
        };
        assert_eq!(config.commerce_base_url(), "http://localhost:1337");
    }
}
