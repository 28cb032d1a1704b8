//! Server configuration from environment variables.
//!
//! | Variable             | Default                      |
//! |----------------------|------------------------------|
//! | `DATABASE_URL`       | `postgres://localhost/vault` |
//! | `HOST`               | `0.0.0.0`                    |
//! | `PORT`               | `4000`                       |
//! | `DB_MAX_CONNECTIONS` | `10`                         |
//! | `QUERY_TIMEOUT_SECS` | `3`                          |
//! | `LOG_FORMAT`         | `text` (or `json`)           |
//! | `LOG_FILE`           | unset (stdout only)          |
//! | `LOG_ANSI`           | auto-detected                |
//!
//! Empty values count as unset. Unparsable numbers are errors rather than
//! silently falling back to defaults.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

use vault_core::defaults;
use vault_db::pool::DEFAULT_MAX_CONNECTIONS;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/vault";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4000;

/// Log output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub query_timeout: Duration,
    pub log_format: LogFormat,
    pub log_file: Option<String>,
    /// `None` lets the subscriber decide.
    pub log_ansi: Option<bool>,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let query_timeout_secs: u64 = parse_var(
            get("QUERY_TIMEOUT_SECS"),
            "QUERY_TIMEOUT_SECS",
            defaults::QUERY_TIMEOUT_SECS,
        )?;
        if query_timeout_secs == 0 {
            bail!("QUERY_TIMEOUT_SECS must be greater than zero");
        }

        let db_max_connections: u32 = parse_var(
            get("DB_MAX_CONNECTIONS"),
            "DB_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be greater than zero");
        }

        let log_format = match get("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be \"text\" or \"json\", got {:?}", other),
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(get("PORT"), "PORT", DEFAULT_PORT)?,
            db_max_connections,
            query_timeout: Duration::from_secs(query_timeout_secs),
            log_format,
            log_file: get("LOG_FILE"),
            log_ansi: get("LOG_ANSI").map(|v| v == "true" || v == "1"),
        })
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}
