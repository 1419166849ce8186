//! Connection settings.
//!
//! ```toml
//! # anydb.config.toml
//! url = "postgres://app@localhost/app"
//!
//! [connections]
//! min = 1
//! max = 10
//! acquireTimeoutMs = 30000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anydb_core::{AnydbError, PoolConfig};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "anydb.config.toml";
pub const URL_ENV: &str = "DATABASE_URL";

/// Where to connect and how many connections to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Connection url; its scheme picks the dialect (`sqlite3://`, `postgres://`)
    pub url: String,
    #[serde(default)]
    pub connections: PoolConfig,
}

impl Config {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connections: PoolConfig::default(),
        }
    }

    /// Sets the pool bounds.
    pub fn connections(mut self, min: u32, max: u32) -> Self {
        self.connections =
            PoolConfig::new(min, max).with_acquire_timeout(self.connections.acquire_timeout());
        self
    }

    /// Sets how long a query waits for a free connection.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.connections = self.connections.with_acquire_timeout(timeout);
        self
    }

    /// Load from default config file
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.into())
            } else {
                ConfigError::Io(path.into(), e)
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.into(), e))?;
        config.validate()
    }

    /// Parses TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()
    }

    /// Reads the url from `DATABASE_URL`, with default pool bounds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(URL_ENV).map_err(|_| ConfigError::MissingEnv(URL_ENV))?;
        Self::new(url).validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.connections.min > self.connections.max {
            return Err(ConfigError::InvalidConnections {
                min: self.connections.min,
                max: self.connections.max,
            });
        }
        Ok(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("url is empty")]
    EmptyUrl,

    #[error("connections.min ({min}) exceeds connections.max ({max})")]
    InvalidConnections { min: u32, max: u32 },
}

impl From<ConfigError> for AnydbError {
    fn from(err: ConfigError) -> Self {
        AnydbError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_with_default_connections() {
        let cfg = Config::from_toml(r#"url = "sqlite3://:memory:""#).unwrap();
        assert_eq!(cfg.url, "sqlite3://:memory:");
        assert_eq!(cfg.connections, PoolConfig::default());
    }

    #[test]
    fn connections_table() {
        let cfg = Config::from_toml(
            r#"
            url = "postgres://app@localhost/app"
            [connections]
            min = 2
            max = 8
        "#,
        )
        .unwrap();
        assert_eq!(cfg, Config::new("postgres://app@localhost/app").connections(2, 8));
    }

    #[test]
    fn acquire_timeout_key() {
        let cfg = Config::from_toml(
            r#"
            url = "sqlite3:"
            connections = { max = 1, acquireTimeoutMs = 250 }
        "#,
        )
        .unwrap();
        assert_eq!(cfg.connections.acquire_timeout(), Duration::from_millis(250));
        assert_eq!(
            cfg,
            Config::new("sqlite3:")
                .acquire_timeout(Duration::from_millis(250))
                .connections(0, 1)
        );
    }

    #[test]
    fn invalid_configs() {
        assert!(matches!(Config::from_toml(r#"url = " ""#), Err(ConfigError::EmptyUrl)));
        assert!(matches!(
            Config::from_toml("url = \"sqlite3:\"\nconnections = { min = 5, max = 2 }"),
            Err(ConfigError::InvalidConnections { min: 5, max: 2 })
        ));
        assert!(matches!(Config::from_toml("nope"), Err(ConfigError::Parse(..))));
    }

    #[test]
    fn missing_file() {
        let err = Config::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
