//! Server configuration loaded from environment variables.

use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
}

impl AppConfig {
    /// Reads `HTTP_HOST`, `HTTP_PORT`, `DATABASE_URL`,
    /// `DATABASE_MAX_CONNECTIONS`, `JWT_SECRET` and `SESSION_TTL_HOURS`.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            }),
            _ => None,
        };

        let session_ttl_hours: i64 = parse_var("SESSION_TTL_HOURS", 24)?;
        if session_ttl_hours <= 0 {
            bail!("SESSION_TTL_HOURS must be positive, got {}", session_ttl_hours);
        }

        Ok(Self {
            host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("HTTP_PORT", 3000)?,
            database,
            jwt_secret,
            session_ttl_hours,
        })
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}
