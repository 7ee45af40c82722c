//! Registry metadata shared across resolver calls

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry document for one package name (`GET /<name>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    pub name: String,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub versions: BTreeMap<String, VersionMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMeta {
    pub version: String,
    pub dist: DistInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistInfo {
    pub tarball: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shasum: Option<String>,
}

impl PackageMeta {
    /// Version the given dist-tag points at
    #[must_use]
    pub fn tagged(&self, tag: &str) -> Option<&VersionMeta> {
        self.dist_tags
            .get(tag)
            .and_then(|version| self.versions.get(version))
    }
}

/// Cache of [`PackageMeta`] keyed by package name
///
/// Cloning shares the underlying map, so one cache can be handed to every
/// fetch of an install run.
#[derive(Debug, Clone, Default)]
pub struct MetaCache {
    inner: Arc<DashMap<String, PackageMeta>>,
}

impl MetaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<PackageMeta> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, meta: PackageMeta) {
        self.inner.insert(meta.name.clone(), meta);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "name": "left-pad",
        "dist-tags": { "latest": "1.3.0" },
        "versions": {
            "1.3.0": {
                "version": "1.3.0",
                "dist": {
                    "tarball": "https://registry.npmjs.org/left-pad/-/left-pad-1.3.0.tgz",
                    "shasum": "5b8a3a7765dfe001261dde915589e782f8c94d1e"
                }
            }
        }
    }"#;

    #[test]
    fn test_tagged_lookup() {
        let meta: PackageMeta = serde_json::from_str(DOC).unwrap();
        assert_eq!(meta.tagged("latest").unwrap().version, "1.3.0");
        assert!(meta.tagged("next").is_none());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = MetaCache::new();
        let other = cache.clone();
        cache.insert(serde_json::from_str(DOC).unwrap());
        assert!(other.contains("left-pad"));
        assert_eq!(other.len(), 1);
        assert_eq!(other.get("left-pad").unwrap().dist_tags["latest"], "1.3.0");
    }
}
