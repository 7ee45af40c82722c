//! Integrity checking against the digest sidecar

use crate::layout::shasum_path;
use std::path::Path;
use stowage_errors::{Error, StorageError};
use stowage_hash::{hash_directory, Hash};

/// Whether `target` still matches the digest recorded at commit time
///
/// Never fails: a missing or unreadable sidecar, or any error while hashing,
/// counts as touched.
pub async fn is_untouched(target: &Path) -> bool {
    match check(target).await {
        Ok(untouched) => untouched,
        Err(e) => {
            tracing::debug!(target = %target.display(), error = %e, "integrity check inconclusive");
            false
        }
    }
}

async fn check(target: &Path) -> Result<bool, Error> {
    let sidecar = shasum_path(target);
    let recorded = tokio::fs::read_to_string(&sidecar)
        .await
        .map_err(|e| StorageError::DigestUnreadable {
            path: sidecar.display().to_string(),
            message: e.to_string(),
        })?;
    let recorded = Hash::parse_sidecar(&recorded, &sidecar)?;
    let current = hash_directory(target).await?;
    Ok(recorded == current)
}

/// Result of recording a digest after commit
///
/// Only ever inspected for logging; a failure here never fails the fetch.
#[derive(Debug, Clone)]
#[must_use]
pub enum DigestOutcome {
    Recorded(Hash),
    Failed(Error),
}

impl DigestOutcome {
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Hash `target` and write the result to its sidecar
pub async fn record_digest(target: &Path) -> DigestOutcome {
    let hash = match hash_directory(target).await {
        Ok(hash) => hash,
        Err(e) => return DigestOutcome::Failed(e),
    };

    let sidecar = shasum_path(target);
    match tokio::fs::write(&sidecar, hash.to_hex()).await {
        Ok(()) => DigestOutcome::Recorded(hash),
        Err(e) => DigestOutcome::Failed(
            StorageError::DigestWriteFailed {
                path: sidecar.display().to_string(),
                message: e.to_string(),
            }
            .into(),
        ),
    }
}
