//! Resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("no resolver accepts spec {spec}")]
    Unsupported { spec: String },

    #[error("no version of {name} matches {range}")]
    NoMatchingVersion { name: String, range: String },

    #[error("local package not found: {path}")]
    LocalPathNotFound { path: String },

    #[error("resolution failed for {spec}: {message}")]
    Failed { spec: String, message: String },
}

impl UserFacingError for ResolveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoMatchingVersion { .. } => Some("Relax the version range or check the tag."),
            Self::LocalPathNotFound { .. } => {
                Some("Local specs are resolved relative to the project root.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Unsupported { .. } => "resolve.unsupported",
            Self::NoMatchingVersion { .. } => "resolve.no_matching_version",
            Self::LocalPathNotFound { .. } => "resolve.local_path_not_found",
            Self::Failed { .. } => "resolve.failed",
        };
        Some(code)
    }
}
