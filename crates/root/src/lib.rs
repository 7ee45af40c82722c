#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Filesystem operations for stowage
//!
//! Async primitives the store is built on: existence checks, recursive
//! removal that tolerates missing paths, the atomic rename used to publish
//! store entries, and tree copy / hard-link helpers for local packages.

use std::io::ErrorKind;
use std::path::Path;
use stowage_errors::StorageError;
use tokio::fs;

/// Result type for filesystem operations
type Result<T> = std::result::Result<T, stowage_errors::Error>;

/// Check if a path exists (without following a final symlink)
pub async fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

/// Create a directory with all parent directories
///
/// # Errors
///
/// Returns an error if:
/// - Permission is denied
/// - Any I/O operation fails during directory creation
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, path).into())
}

/// Recursively remove a file or directory
///
/// Removing a path that does not exist is a no-op.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub async fn remove_all(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StorageError::from_io_with_path(&e, path).into()),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(()),
        // Lost a race with another remover
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::from_io_with_path(&e, path).into()),
    }
}

/// Atomically rename `src` onto `dst`
///
/// Both paths must live on the same filesystem. Observers of `dst` see
/// either its previous state or the complete `src` tree, never a mix.
///
/// # Errors
///
/// Returns `StorageError::AtomicRenameFailed` if the rename fails
/// (cross-device, permissions, non-empty destination directory).
pub async fn atomic_rename(src: &Path, dst: &Path) -> Result<()> {
    fs::rename(src, dst).await.map_err(|e| {
        StorageError::AtomicRenameFailed {
            from: src.display().to_string(),
            to: dst.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Recursively copy a directory
///
/// Symlinks are recreated rather than followed.
///
/// # Errors
///
/// Returns an error if:
/// - Creating the destination directory fails
/// - Reading the source directory fails
/// - Copying any file or subdirectory fails
pub async fn copy_directory(src: &Path, dst: &Path) -> Result<()> {
    mirror_directory(src, dst, FileMode::Copy).await
}

/// Recreate a directory tree, hard-linking every regular file
///
/// # Errors
///
/// Returns an error if the tree cannot be read or a link cannot be created
/// (for example across filesystems).
pub async fn link_directory(src: &Path, dst: &Path) -> Result<()> {
    mirror_directory(src, dst, FileMode::HardLink).await
}

#[derive(Clone, Copy)]
enum FileMode {
    Copy,
    HardLink,
}

async fn mirror_directory(src: &Path, dst: &Path, mode: FileMode) -> Result<()> {
    create_dir_all(dst).await?;

    let mut entries = fs::read_dir(src)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, src))?;
    while let Some(entry) = entries.next_entry().await? {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            Box::pin(mirror_directory(&src_path, &dst_path, mode)).await?;
        } else if file_type.is_symlink() {
            copy_symlink(&src_path, &dst_path).await?;
        } else {
            let result = match mode {
                FileMode::Copy => fs::copy(&src_path, &dst_path).await.map(|_| ()),
                FileMode::HardLink => fs::hard_link(&src_path, &dst_path).await,
            };
            result.map_err(|e| StorageError::from_io_with_path(&e, &src_path))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src).await?;
    fs::symlink(&target, dst)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, dst).into())
}

#[cfg(not(unix))]
async fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .await
        .map(|_| ())
        .map_err(|e| StorageError::from_io_with_path(&e, src).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn sample(root: &Path) {
        fs::create_dir_all(root.join("lib")).await.unwrap();
        fs::write(root.join("package.json"), b"{}").await.unwrap();
        fs::write(root.join("lib/a.js"), b"a").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let dir = tempdir().unwrap();
        remove_all(&dir.path().join("nothing/here")).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_file_and_tree() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("sidecar");
        fs::write(&file, b"x").await.unwrap();
        remove_all(&file).await.unwrap();
        assert!(!exists(&file).await);

        let tree = dir.path().join("tree");
        sample(&tree).await;
        remove_all(&tree).await.unwrap();
        assert!(!exists(&tree).await);
    }

    #[tokio::test]
    async fn test_atomic_rename_moves_tree() {
        let dir = tempdir().unwrap();
        let stage = dir.path().join("pkg_stage");
        let target = dir.path().join("pkg");
        sample(&stage).await;

        atomic_rename(&stage, &target).await.unwrap();
        assert!(!exists(&stage).await);
        assert!(exists(&target.join("lib/a.js")).await);
    }

    #[tokio::test]
    async fn test_atomic_rename_missing_source() {
        let dir = tempdir().unwrap();
        let err = atomic_rename(&dir.path().join("a"), &dir.path().join("b"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            stowage_errors::Error::Storage(StorageError::AtomicRenameFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_copy_and_link_directory() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        sample(&src).await;

        let copied = dir.path().join("copied");
        copy_directory(&src, &copied).await.unwrap();
        assert_eq!(fs::read(copied.join("lib/a.js")).await.unwrap(), b"a");

        let linked = dir.path().join("linked");
        link_directory(&src, &linked).await.unwrap();
        assert_eq!(fs::read(linked.join("lib/a.js")).await.unwrap(), b"a");

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let a = fs::metadata(src.join("lib/a.js")).await.unwrap();
            let b = fs::metadata(linked.join("lib/a.js")).await.unwrap();
            assert_eq!(a.ino(), b.ino());
        }
    }
}
