#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package manifest reading for stowage
//!
//! Reads and minimally validates the `package.json` at the root of a package
//! directory. Interpreting dependencies is left to callers.

use std::path::Path;
use stowage_errors::{Error, PackageError};
use stowage_types::PackageManifest;

/// File name of the manifest inside a package directory
pub const MANIFEST_FILE: &str = "package.json";

/// Parse manifest JSON, attributing errors to `origin`
///
/// # Errors
///
/// Returns `PackageError::InvalidManifest` if the JSON is malformed, is not
/// an object with string `name` and `version` fields, or the name is empty.
pub fn from_json(content: &str, origin: &Path) -> Result<PackageManifest, Error> {
    let invalid = |message: String| PackageError::InvalidManifest {
        path: origin.display().to_string(),
        message,
    };

    let manifest: PackageManifest =
        serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

    if manifest.name.trim().is_empty() {
        return Err(invalid("name must not be empty".to_string()).into());
    }

    Ok(manifest)
}

/// Read `package.json` from the package directory `dir`
///
/// # Errors
///
/// Returns `PackageError::ManifestMissing` if the file does not exist and
/// `PackageError::InvalidManifest` if it cannot be read or parsed.
pub async fn read_package_manifest(dir: &Path) -> Result<PackageManifest, Error> {
    let path = dir.join(MANIFEST_FILE);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PackageError::ManifestMissing {
                path: path.display().to_string(),
            }
            .into());
        }
        Err(e) => {
            return Err(PackageError::InvalidManifest {
                path: path.display().to_string(),
                message: format!("failed to read manifest: {e}"),
            }
            .into());
        }
    };

    let manifest = from_json(&content, &path)?;
    tracing::trace!(name = %manifest.name, version = %manifest.version, "read package manifest");
    Ok(manifest)
}
