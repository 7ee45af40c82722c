use crate::locker::SharedResult;
use std::path::{Path, PathBuf};
use stowage_errors::StorageError;
use stowage_events::{AppEvent, EventEmitter, EventMeta, EventSender, FetchEvent};
use stowage_types::{PackageId, PackageManifest};

/// Handle to a package being fetched
///
/// Both futures can be cloned and awaited any number of times. The manifest
/// may be available before the files are, when the resolver read it from
/// the package source.
pub struct FetchedPackage {
    pub(crate) id: PackageId,
    pub(crate) path: PathBuf,
    pub(crate) src_path: Option<PathBuf>,
    pub(crate) fetching_pkg: SharedResult<PackageManifest>,
    pub(crate) fetching_files: SharedResult<bool>,
    pub(crate) events: Option<EventSender>,
}

impl EventEmitter for FetchedPackage {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }

    fn enrich_event_meta(&self, _event: &AppEvent, meta: &mut EventMeta) {
        meta.set_label("package_id", self.id.as_str());
    }
}

impl FetchedPackage {
    #[must_use]
    pub fn id(&self) -> &PackageId {
        &self.id
    }

    /// `<store>/<id>`
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source directory, for packages resolved to a local directory
    #[must_use]
    pub fn src_path(&self) -> Option<&Path> {
        self.src_path.as_deref()
    }

    /// Resolves to the package manifest
    #[must_use]
    pub fn fetching_pkg(&self) -> SharedResult<PackageManifest> {
        self.fetching_pkg.clone()
    }

    /// Resolves to whether new files were written to the store
    #[must_use]
    pub fn fetching_files(&self) -> SharedResult<bool> {
        self.fetching_files.clone()
    }

    /// Wait for the fetch to settle, then delete the store path
    ///
    /// The running fetch is never interrupted. Removal is attempted whether
    /// the fetch succeeded or not; a removal failure is logged and reported
    /// as an event.
    pub async fn abort(&self) {
        if let Err(e) = self.fetching_files.clone().await {
            tracing::debug!(id = %self.id, error = %e, "fetch failed before abort");
        }

        if let Err(e) = stowage_root::remove_all(&self.path).await {
            let cleanup = StorageError::CleanupFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            };
            tracing::warn!(error = %cleanup, "failed to remove aborted package");
            self.emit(AppEvent::Fetch(FetchEvent::CleanupFailed {
                target: self.path.display().to_string(),
                error: cleanup.to_string(),
            }));
        }
    }
}

impl std::fmt::Debug for FetchedPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedPackage")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("src_path", &self.src_path)
            .finish_non_exhaustive()
    }
}
