//! Deterministic digest of a directory tree
//!
//! The digest covers every entry below the root: its relative path, its
//! kind, file contents (plus the executable bit on unix) and symlink
//! targets. Entries are visited in sorted path order so the result does not
//! depend on the order the filesystem returns them in.

use crate::Hash;
use blake3::Hasher;
use std::path::{Component, Path, PathBuf};
use stowage_errors::{Error, StorageError};

/// Kind of entry folded into a tree digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TreeEntryKind {
    Directory,
    File,
    Symlink,
}

impl TreeEntryKind {
    fn tag(self) -> u8 {
        match self {
            Self::Directory => b'd',
            Self::File => b'f',
            Self::Symlink => b'l',
        }
    }
}

struct TreeEntry {
    relative: String,
    absolute: PathBuf,
    kind: TreeEntryKind,
}

/// Compute the digest of the directory at `root`
///
/// # Errors
///
/// Returns an error if `root` is not a directory or any entry below it
/// cannot be listed or read.
pub async fn hash_directory(root: &Path) -> Result<Hash, Error> {
    let metadata = tokio::fs::symlink_metadata(root)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, root))?;
    if !metadata.is_dir() {
        return Err(StorageError::DigestUnreadable {
            path: root.display().to_string(),
            message: "not a directory".to_string(),
        }
        .into());
    }

    let mut entries = collect_entries(root).await?;
    entries.sort_by(|a, b| a.relative.cmp(&b.relative));

    let mut hasher = Hasher::new();
    for entry in &entries {
        hasher.update(&[entry.kind.tag()]);
        hasher.update(entry.relative.as_bytes());
        hasher.update(&[0]);

        match entry.kind {
            TreeEntryKind::Directory => {}
            TreeEntryKind::File => {
                let content = Hash::hash_file(&entry.absolute).await?;
                hasher.update(content.as_bytes());
                hasher.update(&[u8::from(is_executable(&entry.absolute).await?)]);
            }
            TreeEntryKind::Symlink => {
                let target = tokio::fs::read_link(&entry.absolute)
                    .await
                    .map_err(|e| StorageError::from_io_with_path(&e, &entry.absolute))?;
                hasher.update(target.to_string_lossy().as_bytes());
            }
        }
        hasher.update(&[0]);
    }

    Ok(hasher.finalize().into())
}

async fn collect_entries(root: &Path) -> Result<Vec<TreeEntry>, Error> {
    let mut entries = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut read_dir = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &dir))?;

        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            let kind = if file_type.is_symlink() {
                TreeEntryKind::Symlink
            } else if file_type.is_dir() {
                pending.push(path.clone());
                TreeEntryKind::Directory
            } else {
                TreeEntryKind::File
            };

            entries.push(TreeEntry {
                relative: relative_key(root, &path)?,
                absolute: path,
                kind,
            });
        }
    }

    Ok(entries)
}

/// Relative path joined with `/` regardless of platform
fn relative_key(root: &Path, path: &Path) -> Result<String, Error> {
    let relative = path.strip_prefix(root).map_err(|_| StorageError::IoError {
        message: format!("failed to compute relative path for {}", path.display()),
    })?;

    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

#[cfg(unix)]
async fn is_executable(path: &Path) -> Result<bool, Error> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = tokio::fs::metadata(path).await?;
    Ok(metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn is_executable(_path: &Path) -> Result<bool, Error> {
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::fs;

    async fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("lib/nested")).await.unwrap();
        fs::write(root.join("package.json"), br#"{"name":"a","version":"1.0.0"}"#)
            .await
            .unwrap();
        fs::write(root.join("lib/index.js"), b"module.exports = 1;\n")
            .await
            .unwrap();
        fs::write(root.join("lib/nested/util.js"), b"exports.x = 2;\n")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_identical_trees_hash_equal() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        sample_tree(a.path()).await;
        sample_tree(b.path()).await;

        let ha = hash_directory(a.path()).await.unwrap();
        let hb = hash_directory(b.path()).await.unwrap();
        assert_eq!(ha, hb);
    }

    #[tokio::test]
    async fn test_content_change_changes_digest() {
        let dir = tempdir().unwrap();
        sample_tree(dir.path()).await;
        let before = hash_directory(dir.path()).await.unwrap();

        fs::write(dir.path().join("lib/index.js"), b"module.exports = 2;\n")
            .await
            .unwrap();
        let after = hash_directory(dir.path()).await.unwrap();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn test_rename_changes_digest() {
        let dir = tempdir().unwrap();
        sample_tree(dir.path()).await;
        let before = hash_directory(dir.path()).await.unwrap();

        fs::rename(dir.path().join("lib/index.js"), dir.path().join("lib/main.js"))
            .await
            .unwrap();
        let after = hash_directory(dir.path()).await.unwrap();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn test_empty_directory_counts() {
        let dir = tempdir().unwrap();
        sample_tree(dir.path()).await;
        let before = hash_directory(dir.path()).await.unwrap();

        fs::create_dir(dir.path().join("empty")).await.unwrap();
        let after = hash_directory(dir.path()).await.unwrap();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn test_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"x").await.unwrap();
        assert!(hash_directory(&file).await.is_err());
        assert!(hash_directory(&dir.path().join("missing")).await.is_err());
    }
}
