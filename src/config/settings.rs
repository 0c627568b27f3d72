//! Process settings from environment variables.

use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/proxy.db";
pub const DEFAULT_SCHEMA_DIR: &str = "schemas";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
/// `test.json` holds the fixture collection; it is only served when explicitly un-excluded.
pub const DEFAULT_SCHEMA_EXCLUDE: &str = "test";

#[derive(Clone, Debug)]
pub struct ProxySettings {
    pub database_url: String,
    pub schema_dir: PathBuf,
    pub bind_addr: String,
    pub max_connections: u32,
    pub body_limit: usize,
    pub schema_exclude: HashSet<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        ProxySettings {
            database_url: DEFAULT_DATABASE_URL.into(),
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit: DEFAULT_BODY_LIMIT,
            schema_exclude: parse_list(DEFAULT_SCHEMA_EXCLUDE),
        }
    }
}

impl ProxySettings {
    /// Read `DATABASE_URL`, `SCHEMA_DIR`, `BIND_ADDR`, `DB_MAX_CONNECTIONS`, `BODY_LIMIT_BYTES`, `SCHEMA_EXCLUDE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ProxySettings::default();
        Ok(ProxySettings {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            schema_dir: lookup("SCHEMA_DIR").map(PathBuf::from).unwrap_or(defaults.schema_dir),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_number(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            body_limit: parse_number(&lookup, "BODY_LIMIT_BYTES")?.unwrap_or(defaults.body_limit),
            schema_exclude: lookup("SCHEMA_EXCLUDE")
                .map(|s| parse_list(&s))
                .unwrap_or(defaults.schema_exclude),
        })
    }
}

fn parse_number<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| ConfigError::Setting {
            key,
            message: e.to_string(),
        }),
    }
}

fn parse_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
