use serde::{Deserialize, Serialize};
use std::fmt;
use stowage_types::LoggedPackage;

/// Progress of a single package request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// Resolution or the file fetch failed
    Error,
    /// Files are about to be downloaded into the store
    DownloadQueued,
    /// The resolver produced an id and a resolution
    Resolved,
    /// A verified copy already exists in the store
    FoundInStore,
    /// Files were moved into place and the digest was recorded
    Committed,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::DownloadQueued => "download_queued",
            Self::Resolved => "resolved",
            Self::FoundInStore => "found_in_store",
            Self::Committed => "committed",
        };
        f.write_str(s)
    }
}

/// Events produced while resolving and fetching packages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchEvent {
    Status {
        status: FetchStatus,
        package: LoggedPackage,
    },

    /// An existing store entry was modified and is being downloaded again
    Refetching { target: String },

    /// The digest sidecar could not be written after a successful commit
    DigestFailed { target: String, error: String },

    /// Removing a partially written target failed during abort
    CleanupFailed { target: String, error: String },
}

impl FetchEvent {
    #[must_use]
    pub fn status(status: FetchStatus, package: LoggedPackage) -> Self {
        Self::Status { status, package }
    }
}
