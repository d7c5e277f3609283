//! Server configuration.
//!
//! Values come from an optional TOML file. Every field has a default, and the
//! bot token can also be supplied through `TELEGRAM_BOT_TOKEN`.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable that overrides [`ServerConfig::telegram_token`].
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Which [`PlayerStore`](crate::store::PlayerStore) backend to run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// Records live in process memory.
    Memory,
    /// Records live in a SQLite file.
    #[default]
    Sqlite,
}

/// Configuration for the promo server.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Storage backend.
    #[serde(default)]
    storage: StorageBackend,

    /// SQLite file path, used by the `sqlite` backend.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Public bot username, used to build the account link.
    #[serde(default)]
    bot_username: Option<String>,

    /// Bot API token. Without one, notifications are only logged and the
    /// link poller does not run.
    #[serde(default)]
    telegram_token: Option<String>,

    /// Long-poll timeout for `getUpdates`, in seconds.
    #[serde(default = "default_link_poll_timeout_secs")]
    link_poll_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "glamour_promo.db".to_string()
}

fn default_link_poll_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageBackend::default(),
            db_path: default_db_path(),
            bot_username: None,
            telegram_token: None,
            link_poll_timeout_secs: default_link_poll_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(storage = %config.storage, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if given, otherwise defaults, then applies the
    /// environment token override.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_token(std::env::var(TOKEN_ENV).ok()))
    }

    /// Replaces the token with `token` when it is non-empty.
    pub fn with_env_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            debug!("Bot token taken from environment");
            self.telegram_token = Some(token);
        }
        self
    }

    /// Overrides the bind host.
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the storage backend.
    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }

    /// Overrides the SQLite path.
    pub fn with_db_path(mut self, db_path: String) -> Self {
        self.db_path = db_path;
        self
    }

    /// Long-poll timeout as a [`Duration`].
    pub fn link_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.link_poll_timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").expect("parse");
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(*config.port(), 3000);
        assert_eq!(*config.storage(), StorageBackend::Sqlite);
        assert_eq!(config.telegram_token(), &None);
        assert_eq!(config.link_poll_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file() {
        let config = ServerConfig::from_toml(
            r#"
            port = 8080
            storage = "memory"
            bot_username = "glamour_promo_bot"
            "#,
        )
        .expect("parse");
        assert_eq!(*config.port(), 8080);
        assert_eq!(*config.storage(), StorageBackend::Memory);
        assert_eq!(config.bot_username().as_deref(), Some("glamour_promo_bot"));
    }

    #[test]
    fn test_bad_backend_is_rejected() {
        let err = ServerConfig::from_toml(r#"storage = "redis""#).expect_err("invalid");
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_env_token_overrides_only_when_set() {
        let config = ServerConfig::from_toml(r#"telegram_token = "file""#).expect("parse");
        let kept = config.clone().with_env_token(Some("  ".to_string()));
        assert_eq!(kept.telegram_token().as_deref(), Some("file"));
        let replaced = config.with_env_token(Some("env".to_string()));
        assert_eq!(replaced.telegram_token().as_deref(), Some("env"));
    }
}
