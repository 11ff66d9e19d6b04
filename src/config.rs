use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Process settings read from the environment (and `.env`, via `dotenvy`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub product_service_url: String,
    pub kafka_brokers: String,
    pub stock_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = or_default("PORT", "8003");
        let port = port
            .parse()
            .map_err(|_| ConfigError::Invalid { name: "PORT", value: port })?;
        let stock_timeout = or_default("STOCK_TIMEOUT_SECS", "5");
        let stock_timeout = stock_timeout.parse().map_err(|_| ConfigError::Invalid {
            name: "STOCK_TIMEOUT_SECS",
            value: stock_timeout,
        })?;

        Ok(Self {
            database_url,
            host: or_default("HOST", "0.0.0.0"),
            port,
            product_service_url: or_default("PRODUCT_SERVICE_URL", "http://product-service:8002"),
            kafka_brokers: or_default("KAFKA_BOOTSTRAP_SERVERS", "kafka:9092"),
            stock_timeout: Duration::from_secs(stock_timeout),
        })
    }
}
