//! Store and filesystem error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("disk full: {path}")]
    DiskFull { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("path not found: {path}")]
    PathNotFound { path: String },

    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("atomic rename failed: {from} -> {to}: {message}")]
    AtomicRenameFailed {
        from: String,
        to: String,
        message: String,
    },

    #[error("cannot read digest of {path}: {message}")]
    DigestUnreadable { path: String, message: String },

    #[error("failed to persist digest for {path}: {message}")]
    DigestWriteFailed { path: String, message: String },

    #[error("failed to clean up {path}: {message}")]
    CleanupFailed { path: String, message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        // Without a known path, avoid inventing placeholders; preserve message only
        Self::IoError {
            message: err.to_string(),
        }
    }
}

impl StorageError {
    /// Convert an `io::Error` into a `StorageError` with an associated path
    #[must_use]
    pub fn from_io_with_path(err: &std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::NotFound => Self::PathNotFound {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::StorageFull => Self::DiskFull {
                path: path.display().to_string(),
            },
            _ => Self::IoError {
                message: format!("{}: {}", path.display(), err),
            },
        }
    }
}

impl UserFacingError for StorageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DiskFull { .. } => Some("Free up disk space under the store root and retry."),
            Self::PermissionDenied { .. } => {
                Some("Adjust filesystem permissions on the store root and retry.")
            }
            Self::AtomicRenameFailed { .. } => Some(
                "Staging and final store paths must live on the same filesystem; retrying discards the stale staging directory.",
            ),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::IoError { .. } | Self::AtomicRenameFailed { .. } | Self::DigestUnreadable { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DiskFull { .. } => "storage.disk_full",
            Self::PermissionDenied { .. } => "storage.permission_denied",
            Self::PathNotFound { .. } => "storage.path_not_found",
            Self::AlreadyExists { .. } => "storage.already_exists",
            Self::IoError { .. } => "storage.io_error",
            Self::AtomicRenameFailed { .. } => "storage.atomic_rename_failed",
            Self::DigestUnreadable { .. } => "storage.digest_unreadable",
            Self::DigestWriteFailed { .. } => "storage.digest_write_failed",
            Self::CleanupFailed { .. } => "storage.cleanup_failed",
        };
        Some(code)
    }
}
