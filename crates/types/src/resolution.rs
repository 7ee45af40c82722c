//! Resolutions: how to obtain a package's bytes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Description of where a resolved package's files come from
///
/// Produced by a resolver, persisted in the lockfile and consumed by the
/// transport selected from its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resolution {
    /// A gzipped tarball reachable over `http(s)://` or `file:`
    Tarball {
        tarball: String,
        /// Hex SHA-1 of the tarball as published by the registry
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shasum: Option<String>,
    },

    /// A directory on the local filesystem
    Directory { root: PathBuf },

    /// A commit of a git repository
    Git { repo: String, commit: String },
}

impl Resolution {
    /// The discriminant used to pick a transport
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tarball { .. } => "tarball",
            Self::Directory { .. } => "directory",
            Self::Git { .. } => "git",
        }
    }

    /// Source directory for `directory` resolutions
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        match self {
            Self::Directory { root } => Some(root),
            _ => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tarball { tarball, .. } => write!(f, "{tarball}"),
            Self::Directory { root } => write!(f, "file:{}", root.display()),
            Self::Git { repo, commit } => write!(f, "{repo}#{commit}"),
        }
    }
}
