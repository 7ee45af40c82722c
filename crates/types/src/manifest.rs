//! `package.json` contents as read from a fetched package

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stowage_errors::PackageError;

/// Parsed package manifest
///
/// Only the fields the fetch engine and its callers rely on are typed; the
/// remainder is preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub peer_dependencies: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PackageManifest {
    /// Parse the manifest version as semver
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidVersion` if `version` is not valid semver.
    pub fn semver(&self) -> Result<Version, PackageError> {
        Version::parse(&self.version).map_err(|e| PackageError::InvalidVersion {
            version: self.version.clone(),
            message: e.to_string(),
        })
    }
}
