//! Store configuration.
//!
//! Loaded from the environment (`DATABASE_URL`, `SAKILA_POOL_MAX_SIZE`,
//! `SAKILA_POOL_WAIT_TIMEOUT_SECS`) or from a TOML file:
//!
//! ```toml
//! [database]
//! url = "${DATABASE_URL}"
//! pool_max_size = 8
//! pool_wait_timeout_secs = 5
//! ```
//!
//! `${VAR}` references in the URL are replaced from the environment.

use crate::error::{StoreError, StoreResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_POOL_MAX_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub pool_max_size: usize,
    pub pool_wait_timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    url: String,
    pool_max_size: Option<usize>,
    pool_wait_timeout_secs: Option<u64>,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            pool_wait_timeout: None,
        }
    }

    pub fn pool_max_size(mut self, max_size: usize) -> Self {
        self.pool_max_size = max_size;
        self
    }

    pub fn pool_wait_timeout(mut self, timeout: Duration) -> Self {
        self.pool_wait_timeout = Some(timeout);
        self
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let url = lookup("DATABASE_URL")
            .ok_or_else(|| StoreError::Config("DATABASE_URL is not set".to_string()))?;
        let mut config = Self::new(url);

        if let Some(raw) = lookup("SAKILA_POOL_MAX_SIZE") {
            config.pool_max_size = parse_number("SAKILA_POOL_MAX_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("SAKILA_POOL_WAIT_TIMEOUT_SECS") {
            let secs: u64 = parse_number("SAKILA_POOL_WAIT_TIMEOUT_SECS", &raw)?;
            config.pool_wait_timeout = Some(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> StoreResult<Self> {
        Self::from_toml_with_lookup(raw, |key| std::env::var(key).ok())
    }

    fn from_toml_with_lookup(
        raw: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> StoreResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| StoreError::Config(format!("failed to parse config: {e}")))?;

        let db = file.database;
        let config = Self {
            database_url: expand_env_vars(&db.url, &lookup)?,
            pool_max_size: db.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE),
            pool_wait_timeout: db.pool_wait_timeout_secs.map(Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> StoreResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(StoreError::Config("database url must not be empty".to_string()));
        }
        if self.pool_max_size == 0 {
            return Err(StoreError::Config("pool_max_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> StoreResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| StoreError::Config(format!("{key} is not a valid number: {raw}")))
}

/// Replace `${VAR}` references using `lookup`.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> StoreResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(StoreError::Config(format!(
                    "unterminated env var reference in: {input}"
                )));
            }
            if key.is_empty() {
                return Err(StoreError::Config(format!(
                    "empty env var reference in: {input}"
                )));
            }

            let value = lookup(&key).ok_or_else(|| {
                StoreError::Config(format!("env var {key} is not set (referenced in config)"))
            })?;
            out.push_str(&value);
        } else {
            out.push(c);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_requires_database_url() {
        let err = StoreConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn env_reads_pool_settings() {
        let config = StoreConfig::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/sakila"),
            ("SAKILA_POOL_MAX_SIZE", "4"),
            ("SAKILA_POOL_WAIT_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/sakila");
        assert_eq!(config.pool_max_size, 4);
        assert_eq!(config.pool_wait_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn env_rejects_bad_pool_size() {
        let err = StoreConfig::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/sakila"),
            ("SAKILA_POOL_MAX_SIZE", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SAKILA_POOL_MAX_SIZE"));
    }

    #[test]
    fn toml_expands_env_references() {
        let raw = r#"
            [database]
            url = "postgres://${PGUSER}@localhost/sakila"
            pool_max_size = 2
        "#;
        let config =
            StoreConfig::from_toml_with_lookup(raw, env(&[("PGUSER", "sakila")])).unwrap();
        assert_eq!(config.database_url, "postgres://sakila@localhost/sakila");
        assert_eq!(config.pool_max_size, 2);
        assert_eq!(config.pool_wait_timeout, None);
    }

    #[test]
    fn toml_defaults_pool_size() {
        let raw = "[database]\nurl = \"postgres://localhost/sakila\"\n";
        let config = StoreConfig::from_toml_with_lookup(raw, env(&[])).unwrap();
        assert_eq!(config.pool_max_size, DEFAULT_POOL_MAX_SIZE);
    }

    #[test]
    fn missing_or_malformed_references_fail() {
        assert!(expand_env_vars("${NOPE}", env(&[])).is_err());
        assert!(expand_env_vars("${OPEN", env(&[])).is_err());
        assert!(expand_env_vars("${}", env(&[])).is_err());
        assert_eq!(expand_env_vars("plain $ text", env(&[])).unwrap(), "plain $ text");
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = StoreConfig::new("postgres://localhost/sakila")
            .pool_max_size(3)
            .pool_wait_timeout(Duration::from_millis(500));
        assert_eq!(config.pool_max_size, 3);
        assert_eq!(config.pool_wait_timeout, Some(Duration::from_millis(500)));
    }
}
