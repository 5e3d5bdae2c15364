//! Configuration loaded from `config.toml` in the data directory
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [review]
//! due_limit = 50
//! ```
//!
//! A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "KERTAUS_DATA_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP API listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Cap on the number of due cards returned per request
    pub due_limit: Option<usize>,
}

impl Config {
    /// Path of the config file inside a data directory
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(data_dir);
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Resolve the data directory: `KERTAUS_DATA_DIR`, else the platform's
/// local data directory (e.g. ~/.local/share/kertaus)
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_local_dir()
        .map(|p| p.join("kertaus"))
        .ok_or(ConfigError::DataDirNotFound)
}
