//! Resolutions recorded during an install, for the lockfile writer

use dashmap::DashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use stowage_types::{PackageId, Resolution};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShrinkwrapEntry {
    pub resolution: Resolution,
}

/// Concurrent map from package id to the resolution that was used
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct Shrinkwrap {
    packages: Arc<DashMap<PackageId, ShrinkwrapEntry>>,
}

impl Shrinkwrap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &PackageId) -> Option<ShrinkwrapEntry> {
        self.packages.get(id).map(|entry| entry.value().clone())
    }

    pub fn record(&self, id: PackageId, resolution: Resolution) {
        self.packages.insert(id, ShrinkwrapEntry { resolution });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Sorted copy of the current contents
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PackageId, ShrinkwrapEntry> {
        self.packages
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl From<BTreeMap<PackageId, ShrinkwrapEntry>> for Shrinkwrap {
    fn from(entries: BTreeMap<PackageId, ShrinkwrapEntry>) -> Self {
        let shrinkwrap = Self::new();
        for (id, entry) in entries {
            shrinkwrap.packages.insert(id, entry);
        }
        shrinkwrap
    }
}

impl Serialize for Shrinkwrap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Shrinkwrap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<PackageId, ShrinkwrapEntry>::deserialize(deserializer).map(Self::from)
    }
}
