#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for stowage
//!
//! Values come from, in increasing precedence:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/stowage/config.toml)
//! - Environment variables (`STOWAGE_*`)

pub mod constants;

use constants::{
    APP_DIR, CONFIG_FILE, DEFAULT_TAG, ENV_LINK_LOCAL, ENV_NETWORK_RETRIES, ENV_NETWORK_TIMEOUT,
    ENV_STORE_PATH, ENV_TAG, FALLBACK_STORE_DIR,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stowage_errors::{ConfigError, Error};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PathConfig {
    pub store_path: Option<PathBuf>,
}

/// Defaults applied to every fetch request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchConfig {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub link_local: bool,
    #[serde(default)]
    pub force: bool,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            link_local: false,
            force: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    200
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into())
            }
            Err(e) => return Err(Error::io_with_path(&e, path)),
        };

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.message().to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(path) = std::env::var(ENV_STORE_PATH) {
            if path.trim().is_empty() {
                return Err(invalid(ENV_STORE_PATH, path));
            }
            self.paths.store_path = Some(PathBuf::from(path));
        }

        if let Ok(tag) = std::env::var(ENV_TAG) {
            if tag.trim().is_empty() {
                return Err(invalid(ENV_TAG, tag));
            }
            self.fetch.tag = tag;
        }

        if let Ok(link) = std::env::var(ENV_LINK_LOCAL) {
            self.fetch.link_local = parse_bool(ENV_LINK_LOCAL, link)?;
        }

        if let Ok(retries) = std::env::var(ENV_NETWORK_RETRIES) {
            self.network.retries = retries
                .parse()
                .map_err(|_| invalid(ENV_NETWORK_RETRIES, retries))?;
        }

        if let Ok(timeout) = std::env::var(ENV_NETWORK_TIMEOUT) {
            self.network.timeout = timeout
                .parse()
                .map_err(|_| invalid(ENV_NETWORK_TIMEOUT, timeout))?;
        }

        Ok(())
    }

    /// Get the store path (with default)
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.paths.store_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir().map_or_else(
                || PathBuf::from(FALLBACK_STORE_DIR),
                |dir| dir.join(APP_DIR).join("store"),
            )
        })
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}
