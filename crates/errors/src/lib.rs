#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the stowage fetch engine
//!
//! This crate provides fine-grained error types organized by domain.
//! Every type is `Clone` so that a single failure can be handed to every
//! caller waiting on the same deduplicated fetch.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod install;
pub mod network;
pub mod package;
pub mod resolve;
pub mod storage;

// Re-export all error types at the root
pub use config::ConfigError;
pub use install::InstallError;
pub use network::NetworkError;
pub use package::PackageError;
pub use resolve::ResolveError;
pub use storage::StorageError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("package error: {0}")]
    Package(#[from] PackageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("install error: {0}")]
    Install(#[from] InstallError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

/// Result type alias for stowage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl Error {
    /// The domain error behind this one, if any
    fn domain(&self) -> Option<&dyn UserFacingError> {
        match self {
            Error::Resolve(err) => Some(err),
            Error::Network(err) => Some(err),
            Error::Storage(err) => Some(err),
            Error::Package(err) => Some(err),
            Error::Config(err) => Some(err),
            Error::Install(err) => Some(err),
            Error::Internal(_) | Error::Io { .. } => None,
        }
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match (self.domain(), self) {
            (Some(err), _) => err.user_message(),
            (None, Error::Io { message, path: Some(path), .. }) => {
                Cow::Owned(format!("{}: {message}", path.display()))
            }
            (None, Error::Io { message, .. }) => Cow::Borrowed(message.as_str()),
            (None, _) => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        self.domain().and_then(UserFacingError::user_hint)
    }

    fn is_retryable(&self) -> bool {
        match self.domain() {
            Some(err) => err.is_retryable(),
            None => matches!(
                self,
                Error::Io {
                    kind: std::io::ErrorKind::Interrupted | std::io::ErrorKind::TimedOut,
                    ..
                }
            ),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
            _ => self.domain().and_then(UserFacingError::user_code),
        }
    }
}
