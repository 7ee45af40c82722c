//! Package-related type definitions

use crate::{SHASUM_SUFFIX, STAGE_SUFFIX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};
use stowage_errors::PackageError;

/// Identifier of a resolved package instance
///
/// Doubles as the store key (`<store>/<id>`) and as the deduplication key,
/// so it must be stable across runs and must never escape the store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageId(String);

impl PackageId {
    /// Create a new package ID
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidId` if the id is empty, absolute,
    /// contains `.`/`..` components, or ends with a reserved store suffix.
    pub fn new(id: impl Into<String>) -> Result<Self, PackageError> {
        let id = id.into();
        let invalid = |reason: &str| PackageError::InvalidId {
            id: id.clone(),
            reason: reason.to_string(),
        };

        if id.trim().is_empty() {
            return Err(invalid("empty identifier"));
        }

        let path = Path::new(&id);
        if path.is_absolute() || id.starts_with('/') || id.starts_with('\\') {
            return Err(invalid("identifier must be relative to the store"));
        }

        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(invalid("identifier contains non-normal path components"));
        }

        if id.ends_with(SHASUM_SUFFIX) || id.ends_with(STAGE_SUFFIX) {
            return Err(invalid("identifier uses a reserved store suffix"));
        }

        Ok(Self(id))
    }

    /// Borrow the identifier as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackageId {
    type Error = PackageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PackageId> for String {
    fn from(id: PackageId) -> Self {
        id.0
    }
}

/// A caller-supplied package request such as `lodash@^4.17.0`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// The request exactly as written
    pub raw: String,
    /// Package name, absent for bare local paths (`../lib`)
    pub name: Option<String>,
    /// Everything after the name: a range, a tag, or a local path
    pub raw_spec: String,
}

impl PackageSpec {
    /// Parse a package spec (e.g. `left-pad@1.3.0`, `@scope/pkg@^2`, `file:../pkg`)
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidSpec` if the input is empty or names an
    /// empty package.
    pub fn parse(raw: &str) -> Result<Self, PackageError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PackageError::InvalidSpec {
                spec: raw.to_string(),
            });
        }

        if is_path_like(trimmed) {
            return Ok(Self {
                raw: trimmed.to_string(),
                name: None,
                raw_spec: trimmed.to_string(),
            });
        }

        // Scoped names carry a leading '@' that is not the separator
        let search_from = usize::from(trimmed.starts_with('@'));
        let (name, raw_spec) = match trimmed[search_from..].find('@') {
            Some(pos) => {
                let split = pos + search_from;
                (&trimmed[..split], &trimmed[split + 1..])
            }
            None => (trimmed, ""),
        };

        let bad_scope = name.starts_with('@') && !name.contains('/');
        if name.is_empty() || bad_scope || name.ends_with('/') {
            return Err(PackageError::InvalidSpec {
                spec: raw.to_string(),
            });
        }

        Ok(Self {
            raw: trimmed.to_string(),
            name: Some(name.to_string()),
            raw_spec: raw_spec.to_string(),
        })
    }

    /// Local filesystem path this spec points at, if any
    #[must_use]
    pub fn local_path(&self) -> Option<&str> {
        if let Some(path) = self.raw_spec.strip_prefix("file:") {
            return Some(path);
        }
        if is_path_like(&self.raw_spec) {
            return Some(&self.raw_spec);
        }
        None
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_path_like(s: &str) -> bool {
    s.starts_with("file:")
        || s.starts_with("./")
        || s.starts_with("../")
        || s.starts_with('/')
        || s.starts_with("~/")
        || s == "."
        || s == ".."
}

/// The subset of a spec attached to status notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedPackage {
    pub raw_spec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&PackageSpec> for LoggedPackage {
    fn from(spec: &PackageSpec) -> Self {
        Self {
            raw_spec: spec.raw_spec.clone(),
            name: spec.name.clone(),
        }
    }
}

impl fmt::Display for LoggedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if self.raw_spec.is_empty() => write!(f, "{name}"),
            Some(name) => write!(f, "{name}@{}", self.raw_spec),
            None => write!(f, "{}", self.raw_spec),
        }
    }
}
