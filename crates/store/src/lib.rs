#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package store for stowage
//!
//! Every package id maps to `<store>/<id>`, a directory that only ever
//! appears through an atomic rename of `<store>/<id>_stage`. The digest of
//! the committed tree is kept in `<store>/<id>_shasum`; an entry whose
//! digest no longer matches is considered touched and gets refetched.

mod commit;
mod integrity;
mod layout;

pub use commit::{CommitOptions, StoreCommitter};
pub use integrity::{is_untouched, record_digest, DigestOutcome};
pub use layout::{shasum_path, stage_path, StoreLayout};

use std::path::{Path, PathBuf};
use stowage_errors::Error;
use stowage_root::{exists, remove_all};
use stowage_types::PackageId;

/// State of a store entry as seen from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Missing,
    /// Present and matching its recorded digest
    Untouched,
    /// Present but modified, or without a readable digest
    Touched,
}

/// Read-side view of a store root
#[derive(Debug, Clone)]
pub struct PackageStore {
    layout: StoreLayout,
}

impl PackageStore {
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            layout: StoreLayout::new(base_path),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    #[must_use]
    pub fn package_path(&self, id: &PackageId) -> PathBuf {
        self.layout.target(id)
    }

    pub async fn status(&self, id: &PackageId) -> EntryStatus {
        let target = self.layout.target(id);
        if !exists(&target).await {
            EntryStatus::Missing
        } else if is_untouched(&target).await {
            EntryStatus::Untouched
        } else {
            EntryStatus::Touched
        }
    }

    /// Delete an entry, its digest, and any staging leftover
    ///
    /// # Errors
    ///
    /// Returns an error if any of the paths exists but cannot be removed.
    pub async fn remove(&self, id: &PackageId) -> Result<(), Error> {
        remove_all(&self.layout.target(id)).await?;
        remove_all(&self.layout.shasum(id)).await?;
        remove_all(&self.layout.stage(id)).await?;
        tracing::debug!(id = %id, "removed store entry");
        Ok(())
    }
}
