//! Fetch orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum InstallError {
    #[error("fetch task for {package} did not complete: {message}")]
    TaskError { package: String, message: String },

    #[error("no transport for resolution type {kind}")]
    UnsupportedResolution { kind: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedResolution { .. } => {
                Some("Register a transport for this resolution type.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::TaskError { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::TaskError { .. } => "install.task_error",
            Self::UnsupportedResolution { .. } => "install.unsupported_resolution",
        };
        Some(code)
    }
}
