//! Paths of a store entry and its siblings

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use stowage_types::{PackageId, SHASUM_SUFFIX, STAGE_SUFFIX};

/// `<target>_shasum`: the digest recorded when `target` was committed
#[must_use]
pub fn shasum_path(target: &Path) -> PathBuf {
    with_suffix(target, SHASUM_SUFFIX)
}

/// `<target>_stage`: where a fetch is written before it is renamed
#[must_use]
pub fn stage_path(target: &Path) -> PathBuf {
    with_suffix(target, STAGE_SUFFIX)
}

fn with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(target.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

/// Store root plus the id to path mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<id>`
    #[must_use]
    pub fn target(&self, id: &PackageId) -> PathBuf {
        self.root.join(id.as_str())
    }

    #[must_use]
    pub fn shasum(&self, id: &PackageId) -> PathBuf {
        shasum_path(&self.target(id))
    }

    #[must_use]
    pub fn stage(&self, id: &PackageId) -> PathBuf {
        stage_path(&self.target(id))
    }
}
