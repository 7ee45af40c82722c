//! Resolve-or-reuse, then fetch into the store once per package id

use crate::handle::FetchedPackage;
use crate::locker::{FetchLocker, SharedResult};
use crate::options::FetchOptions;
use crate::shrinkwrap::Shrinkwrap;
use futures::future::{self, FutureExt};
use std::sync::Arc;
use stowage_errors::Error;
use stowage_events::{EventEmitter, EventSender, FetchStatus};
use stowage_net::Transport;
use stowage_resolver::{ResolveContext, Resolver};
use stowage_store::StoreCommitter;
use stowage_types::{LoggedPackage, PackageId, PackageManifest, PackageSpec, Resolution};

/// Entry point for fetching packages into the store
///
/// Clones share the in-flight registry and the shrinkwrap map.
#[derive(Clone)]
pub struct PackageFetcher {
    resolver: Arc<dyn Resolver>,
    committer: StoreCommitter,
    locker: FetchLocker<PackageId, bool>,
    shrinkwrap: Shrinkwrap,
    events: Option<EventSender>,
}

impl EventEmitter for PackageFetcher {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

struct Resolved {
    id: PackageId,
    resolution: Resolution,
    package: Option<PackageManifest>,
}

impl PackageFetcher {
    #[must_use]
    pub fn new(resolver: Arc<dyn Resolver>, transport: Arc<dyn Transport>) -> Self {
        Self {
            resolver,
            committer: StoreCommitter::new(transport),
            locker: FetchLocker::new(),
            shrinkwrap: Shrinkwrap::new(),
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.committer = self.committer.with_events(events.clone());
        self.events = Some(events);
        self
    }

    /// Share an in-flight registry with other fetchers
    #[must_use]
    pub fn with_locker(mut self, locker: FetchLocker<PackageId, bool>) -> Self {
        self.locker = locker;
        self
    }

    /// Record resolutions into an existing shrinkwrap map
    #[must_use]
    pub fn with_shrinkwrap(mut self, shrinkwrap: Shrinkwrap) -> Self {
        self.shrinkwrap = shrinkwrap;
        self
    }

    #[must_use]
    pub fn shrinkwrap(&self) -> &Shrinkwrap {
        &self.shrinkwrap
    }

    #[must_use]
    pub fn locker(&self) -> &FetchLocker<PackageId, bool> {
        &self.locker
    }

    /// Resolve `spec` (or reuse its locked resolution) and start fetching it
    ///
    /// Returns as soon as the fetch is submitted; await the handle's futures
    /// for the manifest and the files. An `Error` status is emitted before a
    /// resolution failure is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver fails.
    pub async fn fetch(
        &self,
        spec: &PackageSpec,
        opts: &FetchOptions,
    ) -> Result<FetchedPackage, Error> {
        tracing::debug!("installing {}", spec.raw);
        let logged = LoggedPackage::from(spec);

        match self.start(spec, opts, &logged).await {
            Ok(fetched) => Ok(fetched),
            Err(e) => {
                tracing::error!(package = %logged, error = %e, "fetch failed");
                self.emit_fetch_status(FetchStatus::Error, &logged);
                self.emit_failure(format!("could not resolve {logged}"), &e);
                Err(e)
            }
        }
    }

    async fn start(
        &self,
        spec: &PackageSpec,
        opts: &FetchOptions,
        logged: &LoggedPackage,
    ) -> Result<FetchedPackage, Error> {
        let Resolved {
            id,
            resolution,
            package,
        } = self.resolve(spec, opts, logged).await?;

        let path = opts.store_path.join(id.as_str());
        let src_path = resolution.source_path().map(ToOwned::to_owned);

        let fetching_files = self.submit(&id, &path, resolution, logged, opts);

        let fetching_pkg: SharedResult<PackageManifest> = match package {
            Some(manifest) => future::ready(Ok(manifest)).boxed().shared(),
            None => {
                let files = fetching_files.clone();
                let target = path.clone();
                async move {
                    files.await?;
                    stowage_manifest::read_package_manifest(&target).await
                }
                .boxed()
                .shared()
            }
        };

        Ok(FetchedPackage {
            id,
            path,
            src_path,
            fetching_pkg,
            fetching_files,
            events: self.events.clone(),
        })
    }

    async fn resolve(
        &self,
        spec: &PackageSpec,
        opts: &FetchOptions,
        logged: &LoggedPackage,
    ) -> Result<Resolved, Error> {
        if let (Some(locked), false) = (&opts.locked, opts.update) {
            tracing::trace!(id = %locked.id, "reusing locked resolution");
            return Ok(Resolved {
                id: locked.id.clone(),
                resolution: locked.resolution.clone(),
                package: None,
            });
        }

        let ctx = ResolveContext {
            root: opts.root.clone(),
            tag: opts.tag.clone(),
            store_path: opts.store_path.clone(),
            meta_cache: opts.meta_cache.clone(),
            logged_package: logged.clone(),
        };
        let result = self.resolver.resolve(spec, &ctx).await?;

        // A matching id keeps the locked resolution and with it the
        // originally published shasum.
        let resolution = match &opts.locked {
            Some(locked) if locked.id == result.id => locked.resolution.clone(),
            _ => result.resolution,
        };
        self.shrinkwrap.record(result.id.clone(), resolution.clone());
        self.emit_fetch_status(FetchStatus::Resolved, logged);

        Ok(Resolved {
            id: result.id,
            resolution,
            package: result.package,
        })
    }

    fn submit(
        &self,
        id: &PackageId,
        target: &std::path::Path,
        resolution: Resolution,
        logged: &LoggedPackage,
        opts: &FetchOptions,
    ) -> SharedResult<bool> {
        let committer = self.committer.clone();
        let target = target.to_path_buf();
        let logged = logged.clone();
        let commit_opts = opts.commit_options();

        self.locker.run_exclusive(id.clone(), move || async move {
            let result = committer
                .commit(&target, &resolution, &logged, commit_opts)
                .await;
            if let Err(e) = &result {
                tracing::error!(package = %logged, target = %target.display(), error = %e, "fetch to store failed");
                committer.emit_fetch_status(FetchStatus::Error, &logged);
                committer.emit_failure(format!("could not fetch {logged} to store"), e);
            }
            result
        })
    }
}
