//! Configuration module
//!
//! Settings are read from a TOML file (default
//! `~/.config/user-store/config.toml`). Every field has a default, so an
//! empty or partial file is valid.
//!
//! ```toml
//! [database]
//! url = "sqlite://./users.db?mode=rwc"
//!
//! [logging]
//! level = "info"
//!
//! [users]
//! email_reuse = "after_soft_delete"   # or "never"
//!
//! [security]
//! bcrypt_cost = 12
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EmailReusePolicy;
use crate::infrastructure::DatabaseConfig;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "USER_STORE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub users: UserSettings,
    pub security: SecuritySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub email_reuse: EmailReusePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// bcrypt work factor, 4..=31
    pub bcrypt_cost: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }
}

/// `$USER_STORE_CONFIG` if set, else `<config dir>/user-store/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("user-store")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.users.email_reuse, EmailReusePolicy::AfterSoftDelete);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.security.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn parses_all_sections() {
        let cfg = AppConfig::from_toml(
            r#"
            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [logging]
            level = "debug"

            [users]
            email_reuse = "never"

            [security]
            bcrypt_cost = 10
            "#,
        )
        .unwrap();

        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.database_config().max_connections, Some(1));
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.users.email_reuse, EmailReusePolicy::Never);
        assert_eq!(cfg.security.bcrypt_cost, 10);
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = AppConfig::from_toml("[users]\nemail_reuse = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/user-store.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
