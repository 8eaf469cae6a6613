use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://electricity.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("HTTP_PORT").ok_or(ConfigError::Missing("HTTP_PORT"))?;

        Ok(Config {
            host: lookup("HTTP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var("HTTP_PORT", port)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(value) => parse_var("DATABASE_MAX_CONNECTIONS", value)?,
                None => 5,
            },
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
