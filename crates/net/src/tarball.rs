//! Gzipped tarball transport (`http(s)://` and `file:` sources)

use crate::transport::unsupported;
use crate::{NetClient, Transport, TransportOptions};
use async_compression::tokio::bufread::GzipDecoder;
use sha1::{Digest, Sha1};
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use stowage_errors::{Error, NetworkError};
use stowage_types::Resolution;
use tar::{Archive, EntryType};
use tokio::io::AsyncReadExt;

/// Downloads a tarball, checks its shasum, and unpacks it
///
/// The single top-level directory found in registry tarballs (`package/`) is
/// stripped so the package root lands directly in the destination.
#[derive(Clone)]
pub struct TarballTransport {
    client: NetClient,
}

impl TarballTransport {
    #[must_use]
    pub fn new(client: NetClient) -> Self {
        Self { client }
    }

    async fn read_source(&self, url: &str) -> Result<Vec<u8>, Error> {
        if let Some(path) = url.strip_prefix("file:") {
            let path = path.strip_prefix("//").unwrap_or(path);
            return tokio::fs::read(path)
                .await
                .map_err(|e| NetworkError::DownloadFailed(format!("{path}: {e}")).into());
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.client.get_bytes(url).await;
        }
        Err(NetworkError::InvalidUrl(url.to_string()).into())
    }
}

#[async_trait::async_trait]
impl Transport for TarballTransport {
    async fn fetch(
        &self,
        resolution: &Resolution,
        dest: &Path,
        _opts: &TransportOptions,
    ) -> Result<(), Error> {
        let Resolution::Tarball { tarball, shasum } = resolution else {
            return Err(unsupported(resolution));
        };

        let compressed = self.read_source(tarball).await?;
        if let Some(expected) = shasum {
            verify_shasum(tarball, &compressed, expected)?;
        }

        let mut archive = Vec::new();
        GzipDecoder::new(compressed.as_slice())
            .read_to_end(&mut archive)
            .await
            .map_err(|e| NetworkError::UnpackFailed {
                url: tarball.clone(),
                message: format!("gzip: {e}"),
            })?;

        stowage_root::create_dir_all(dest).await?;
        let url = tarball.clone();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || unpack(&url, archive, &dest))
            .await
            .map_err(|e| Error::internal(format!("unpack task failed: {e}")))??;

        tracing::debug!(url = %tarball, "unpacked tarball");
        Ok(())
    }
}

/// Compare the hex SHA-1 of `bytes` with the published shasum
///
/// # Errors
///
/// Returns `NetworkError::ChecksumMismatch` when the digests differ.
pub fn verify_shasum(url: &str, bytes: &[u8], expected: &str) -> Result<(), Error> {
    let actual = hex::encode(Sha1::digest(bytes));
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(NetworkError::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.to_string(),
            actual,
        }
        .into())
    }
}

fn unpack(url: &str, archive: Vec<u8>, dest: &Path) -> Result<(), Error> {
    let failed = |message: String| NetworkError::UnpackFailed {
        url: url.to_string(),
        message,
    };

    let mut archive = Archive::new(Cursor::new(archive));
    archive.set_preserve_permissions(true);
    archive.set_unpack_xattrs(false);

    for entry in archive.entries().map_err(|e| failed(e.to_string()))? {
        let mut entry = entry.map_err(|e| failed(e.to_string()))?;
        let path = entry.path().map_err(|e| failed(e.to_string()))?.into_owned();

        let Some(relative) = strip_top_level(&path).map_err(failed)? else {
            continue;
        };

        let entry_type = entry.header().entry_type();
        if !matches!(
            entry_type,
            EntryType::Regular | EntryType::Directory | EntryType::Symlink
        ) {
            tracing::debug!(path = %path.display(), ?entry_type, "skipping tar entry");
            continue;
        }

        let target = contained_target(dest, &relative).map_err(failed)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        entry
            .unpack(&target)
            .map_err(|e| failed(format!("{}: {e}", relative.display())))?;
    }

    Ok(())
}

/// Join `relative` onto `dest`, refusing to pass through a symlink
///
/// A symlink unpacked earlier must not redirect later entries outside
/// `dest`. A symlink sitting at the target itself is removed so the entry
/// replaces it rather than writing through it.
fn contained_target(dest: &Path, relative: &Path) -> Result<PathBuf, String> {
    let mut current = dest.to_path_buf();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            current.push(component);
            match std::fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(format!(
                        "archive entry {} passes through a symlink",
                        relative.display()
                    ));
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => return Err(format!("{}: {e}", current.display())),
            }
        }
    }

    let target = dest.join(relative);
    if let Ok(meta) = std::fs::symlink_metadata(&target) {
        if meta.file_type().is_symlink() {
            std::fs::remove_file(&target).map_err(|e| format!("{}: {e}", target.display()))?;
        }
    }
    Ok(target)
}

/// Drop the first path component, rejecting anything that could escape
fn strip_top_level(path: &Path) -> Result<Option<PathBuf>, String> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(_)) => {}
        Some(Component::CurDir) => return strip_top_level(components.as_path()),
        _ => return Err(format!("unsafe path in archive: {}", path.display())),
    }

    let mut relative = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return Err(format!("archive contains path traversal: {}", path.display())),
        }
    }

    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}
