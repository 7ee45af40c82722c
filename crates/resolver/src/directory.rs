//! Resolver for packages that live in a local directory

use crate::{ResolveContext, ResolveResult, Resolver};
use std::path::{Component, Path, PathBuf};
use stowage_errors::{Error, ResolveError};
use stowage_hash::Hash;
use stowage_types::{PackageId, PackageSpec, Resolution};

/// Prefix of every identifier produced for a local directory
pub const LOCAL_ID_PREFIX: &str = "local";

const LOCAL_DIGEST_LEN: usize = 16;

/// Resolves `file:`, relative and absolute path specs
///
/// The manifest is read straight from the source directory, so callers get
/// package metadata without waiting for the store copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryResolver;

impl DirectoryResolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Absolute, lexically normalized location of a local spec
    fn locate(raw: &str, root: &Path) -> PathBuf {
        let path = match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(raw), |home| home.join(rest)),
            None => PathBuf::from(raw),
        };
        let absolute = if path.is_absolute() {
            path
        } else {
            root.join(path)
        };
        normalize(&absolute)
    }
}

#[async_trait::async_trait]
impl Resolver for DirectoryResolver {
    fn can_resolve(&self, spec: &PackageSpec) -> bool {
        spec.local_path().is_some()
    }

    async fn resolve(
        &self,
        spec: &PackageSpec,
        ctx: &ResolveContext,
    ) -> Result<ResolveResult, Error> {
        let raw = spec.local_path().ok_or_else(|| ResolveError::Unsupported {
            spec: spec.raw.clone(),
        })?;
        let source = Self::locate(raw, &ctx.root);

        let is_dir = tokio::fs::metadata(&source)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ResolveError::LocalPathNotFound {
                path: source.display().to_string(),
            }
            .into());
        }

        let package = stowage_manifest::read_package_manifest(&source).await?;
        let id = PackageId::new(local_id(&source))?;
        tracing::debug!(spec = %spec, id = %id, "resolved local directory");

        Ok(ResolveResult {
            id,
            resolution: Resolution::Directory { root: source },
            package: Some(package),
        })
    }
}

/// `local/<name>-<digest>`: a single segment under `local/`
///
/// The name is the sanitized last path component, kept for readability. The
/// digest covers the full source path, so distinct directories never share
/// an id and no local id is a directory of another.
fn local_id(source: &Path) -> String {
    let name: String = source
        .file_name()
        .map(|name| {
            name.to_string_lossy()
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '@') {
                        c
                    } else {
                        '+'
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    let digest = Hash::from_data(source.as_os_str().as_encoded_bytes()).to_hex();
    format!("{LOCAL_ID_PREFIX}/{name}-{}", &digest[..LOCAL_DIGEST_LEN])
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/work/app/./../lib")),
            PathBuf::from("/work/lib")
        );
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_local_id_is_store_safe() {
        let id = local_id(Path::new("/home/me/my pkg_stage"));
        assert!(id.starts_with("local/my+pkg+stage-"));
        assert_eq!(id.matches('/').count(), 1);
        assert!(PackageId::new(id).is_ok());
    }

    #[test]
    fn test_local_ids_never_nest_or_collide() {
        let outer = local_id(Path::new("/work/lib"));
        let inner = local_id(Path::new("/work/lib/sub"));
        assert!(!Path::new(&inner).starts_with(&outer));
        assert!(!Path::new(&outer).starts_with(&inner));

        assert_ne!(
            local_id(Path::new("/x/a b")),
            local_id(Path::new("/x/a+b"))
        );
        assert_eq!(local_id(Path::new("/x/a")), local_id(Path::new("/x/a")));
    }

    #[test]
    fn test_locate_relative_to_root() {
        let located = DirectoryResolver::locate("../shared", Path::new("/work/app"));
        assert_eq!(located, PathBuf::from("/work/shared"));
    }
}
