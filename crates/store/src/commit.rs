//! Staged fetch and atomic promotion into the store

use crate::integrity::{is_untouched, record_digest, DigestOutcome};
use crate::layout::stage_path;
use std::path::Path;
use std::sync::Arc;
use stowage_errors::Error;
use stowage_events::{AppEvent, EventEmitter, EventSender, FetchEvent, FetchStatus};
use stowage_net::{Transport, TransportOptions};
use stowage_root::{atomic_rename, create_dir_all, exists, remove_all};
use stowage_types::{LoggedPackage, Resolution};

/// Flags that change how a single commit behaves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    pub link_local: bool,
    /// Refetch even when the existing entry verifies
    pub force: bool,
}

/// Writes one store entry: stage, populate, rename, record digest
///
/// Callers must not run two commits for the same target concurrently; the
/// install layer serializes them per package id.
#[derive(Clone)]
pub struct StoreCommitter {
    transport: Arc<dyn Transport>,
    events: Option<EventSender>,
}

impl EventEmitter for StoreCommitter {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl StoreCommitter {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Make `target` hold the files of `resolution`
    ///
    /// Returns `false` when a verified copy was already present and nothing
    /// was written.
    ///
    /// # Errors
    ///
    /// Returns an error if clearing stale paths, the transport, or the final
    /// rename fails. Failing to record the digest is not an error.
    pub async fn commit(
        &self,
        target: &Path,
        resolution: &Resolution,
        package: &LoggedPackage,
        opts: CommitOptions,
    ) -> Result<bool, Error> {
        let target_exists = exists(target).await;

        if target_exists {
            if !opts.force && is_untouched(target).await {
                tracing::debug!(target = %target.display(), "store entry verified");
                self.emit_fetch_status(FetchStatus::FoundInStore, package);
                return Ok(false);
            }
            if opts.force {
                tracing::debug!(target = %target.display(), "forced refetch");
            } else {
                tracing::warn!(
                    "Refetching {} to store, as it was modified",
                    target.display()
                );
            }
            self.emit(AppEvent::Fetch(FetchEvent::Refetching {
                target: target.display().to_string(),
            }));
        }

        let stage = stage_path(target);
        remove_all(&stage).await?;
        if target_exists {
            remove_all(target).await?;
        }

        self.emit_fetch_status(FetchStatus::DownloadQueued, package);
        create_dir_all(&stage).await?;
        self.transport
            .fetch(
                resolution,
                &stage,
                &TransportOptions {
                    link_local: opts.link_local,
                },
            )
            .await?;

        atomic_rename(&stage, target).await?;

        match record_digest(target).await {
            DigestOutcome::Recorded(hash) => {
                tracing::debug!(target = %target.display(), digest = %hash, "committed to store");
            }
            DigestOutcome::Failed(e) => {
                tracing::error!(
                    target = %target.display(),
                    error = %e,
                    "Failed to calculate shasum for {}",
                    target.display()
                );
                self.emit(AppEvent::Fetch(FetchEvent::DigestFailed {
                    target: target.display().to_string(),
                    error: e.to_string(),
                }));
            }
        }

        self.emit_fetch_status(FetchStatus::Committed, package);
        Ok(true)
    }
}
