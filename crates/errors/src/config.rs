//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("no platform config directory")]
    NoConfigDir,

    #[error("invalid config file {path}: {message}")]
    ParseError { path: String, message: String },

    /// An environment override that does not parse
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Create the file, or load without an explicit path."),
            Self::NoConfigDir => Some("Pass a config path or set STOWAGE_STORE_PATH."),
            Self::ParseError { .. } => Some("Check the TOML syntax and section names."),
            Self::InvalidValue { .. } => Some("Unset or correct the STOWAGE_* variable."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound { .. } => "config.not_found",
            Self::NoConfigDir => "config.no_config_dir",
            Self::ParseError { .. } => "config.parse_error",
            Self::InvalidValue { .. } => "config.invalid_value",
        })
    }
}
