use serde::{Deserialize, Serialize};

use crate::EventSource;

pub mod fetch;
pub mod general;

pub use fetch::*;
pub use general::*;

/// Top-level event delivered to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, errors and debug chatter
    General(GeneralEvent),

    /// Per-package resolve/fetch progress
    Fetch(FetchEvent),
}

impl AppEvent {
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Fetch(FetchEvent::Status { .. }) => EventSource::Fetch,
            Self::Fetch(_) => EventSource::Store,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Fetch(FetchEvent::Status {
                status: FetchStatus::Error,
                ..
            }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Fetch(
                FetchEvent::Refetching { .. }
                | FetchEvent::DigestFailed { .. }
                | FetchEvent::CleanupFailed { .. },
            ) => Level::WARN,

            Self::General(GeneralEvent::Debug { .. }) => Level::DEBUG,

            Self::Fetch(FetchEvent::Status { .. }) => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "stowage::events::general",
            Self::Fetch(FetchEvent::Status { .. }) => "stowage::events::fetch",
            Self::Fetch(_) => "stowage::events::store",
        }
    }

    /// Package or store target the event refers to, if any
    #[must_use]
    pub fn correlation_id(&self) -> Option<String> {
        match self {
            Self::General(_) => None,
            Self::Fetch(FetchEvent::Status { package, .. }) => Some(package.to_string()),
            Self::Fetch(
                FetchEvent::Refetching { target }
                | FetchEvent::DigestFailed { target, .. }
                | FetchEvent::CleanupFailed { target, .. },
            ) => Some(target.clone()),
        }
    }
}
