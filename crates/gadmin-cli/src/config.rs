use std::path::{Path, PathBuf};

use gadmin_auth::VisibilityConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found at {0}, run `gadmin init` first")]
    ConfigNotFound(String),

    #[error("TOML deserialization error: {0}")]
    TomlDe(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level console configuration stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub console: ConsoleSettings,
    /// Menu and button tables. Built-in tables are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Backend origin, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Where cached permissions are kept.
    #[serde(default)]
    pub store: StoreKind,
    /// Directory for the file store, database file for the SQLite store.
    pub store_path: String,
    /// File holding the bearer token.
    pub token_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    File,
    Sqlite,
    Memory,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::File => write!(f, "file"),
            StoreKind::Sqlite => write!(f, "sqlite"),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ConsoleConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::TomlDe(e.to_string()))
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::TomlSer(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config for `gadmin init`.
    pub fn default_config(base_dir: &Path) -> Self {
        Self {
            console: ConsoleSettings {
                base_url: "http://127.0.0.1:8080".to_string(),
                store: StoreKind::File,
                store_path: base_dir.join("cache").display().to_string(),
                token_path: base_dir.join("token").display().to_string(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            visibility: None,
        }
    }

    /// Tables in effect: the configured ones, or the built-in defaults.
    pub fn visibility(&self) -> VisibilityConfig {
        self.visibility.clone().unwrap_or_default()
    }

    /// Resolve the config file path: `<base_dir>/gadmin.toml`
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join("gadmin.toml")
    }

    /// Resolve the default home directory: `~/.gadmin`
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".gadmin"))
            .ok_or_else(|| ConfigError::Config("Cannot determine home directory".to_string()))
    }
}
