//! Package manifest error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PackageError {
    #[error("package manifest not found in {path}")]
    ManifestMissing { path: String },

    #[error("invalid manifest {path}: {message}")]
    InvalidManifest { path: String, message: String },

    #[error("invalid package spec: {spec}")]
    InvalidSpec { spec: String },

    #[error("invalid package id: {id}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("invalid version {version}: {message}")]
    InvalidVersion { version: String, message: String },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestMissing { .. } => {
                Some("The fetched package has no package.json at its root.")
            }
            Self::InvalidSpec { .. } => Some("Use the form `name@range` or `@scope/name@range`."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ManifestMissing { .. } => "package.manifest_missing",
            Self::InvalidManifest { .. } => "package.invalid_manifest",
            Self::InvalidSpec { .. } => "package.invalid_spec",
            Self::InvalidId { .. } => "package.invalid_id",
            Self::InvalidVersion { .. } => "package.invalid_version",
        };
        Some(code)
    }
}
