use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stowage_config::Config;
use stowage_resolver::MetaCache;
use stowage_store::CommitOptions;
use stowage_types::{PackageId, Resolution};

/// An id and resolution remembered from a previous run (lockfile entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedResolution {
    pub id: PackageId,
    pub resolution: Resolution,
}

/// Options for a single [`PackageFetcher::fetch`](crate::PackageFetcher::fetch) call
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Root of the shared package store
    pub store_path: PathBuf,
    /// Project root handed to the resolver
    pub root: PathBuf,
    /// Dist-tag used when a spec names no version
    pub tag: String,
    /// Hard-link directory packages into the store instead of copying
    pub link_local: bool,
    /// Refetch even when the store entry verifies
    pub force: bool,
    /// Re-resolve even when `locked` is set
    pub update: bool,
    pub meta_cache: MetaCache,
    pub locked: Option<LockedResolution>,
}

impl FetchOptions {
    #[must_use]
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            tag: stowage_config::constants::DEFAULT_TAG.to_string(),
            link_local: false,
            force: false,
            update: false,
            meta_cache: MetaCache::new(),
            locked: None,
        }
    }

    /// Defaults taken from loaded configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            tag: config.fetch.tag.clone(),
            link_local: config.fetch.link_local,
            force: config.fetch.force,
            ..Self::new(config.store_path())
        }
    }

    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    #[must_use]
    pub fn with_locked(mut self, id: PackageId, resolution: Resolution) -> Self {
        self.locked = Some(LockedResolution { id, resolution });
        self
    }

    #[must_use]
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    #[must_use]
    pub fn with_meta_cache(mut self, meta_cache: MetaCache) -> Self {
        self.meta_cache = meta_cache;
        self
    }

    pub(crate) fn commit_options(&self) -> CommitOptions {
        CommitOptions {
            link_local: self.link_local,
            force: self.force,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.paths.store_path = Some(PathBuf::from("/srv/store"));
        config.fetch.tag = "next".to_string();
        config.fetch.link_local = true;

        let opts = FetchOptions::from_config(&config);
        assert_eq!(opts.store_path, PathBuf::from("/srv/store"));
        assert_eq!(opts.tag, "next");
        assert!(opts.link_local);
        assert!(!opts.force);
        assert!(!opts.update);
        assert!(opts.locked.is_none());
    }
}
