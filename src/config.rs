//! Environment-driven configuration.
//!
//! Required: `JWT_SECRET`. Everything else has a development default.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub max_connections: u32,
}

impl Config {
    /// Read configuration from the process environment. Panics on a missing
    /// secret or an unparseable numeric value; the server cannot start
    /// without a usable configuration.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost:5432/pulsebox".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            token_ttl_minutes: parse_or("TOKEN_TTL_MINUTES", 60),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("invalid {key} value {raw:?}: {e}")),
        Err(_) => default,
    }
}
