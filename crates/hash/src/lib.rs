#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! BLAKE3 digests of store entries
//!
//! A store entry is trusted only while the digest of its tree matches the
//! one written to its `_shasum` sidecar at commit time. This crate computes
//! those digests and reads them back.

mod tree;

pub use tree::hash_directory;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use stowage_errors::{Error, StorageError};
use tokio::io::AsyncReadExt;

const READ_BUF: usize = 64 * 1024;

/// A 32-byte BLAKE3 digest, shown as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; 32]);

impl Hash {
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        blake3::hash(data).into()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the contents of a digest sidecar
    ///
    /// Trailing whitespace (a newline added by an editor, say) is ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DigestUnreadable` naming `origin` if the text
    /// is not a 64-character hex digest.
    pub fn parse_sidecar(text: &str, origin: &Path) -> Result<Self, Error> {
        text.trim_end().parse::<Self>().map_err(|message: String| {
            StorageError::DigestUnreadable {
                path: origin.display().to_string(),
                message,
            }
            .into()
        })
    }

    /// Digest of one file's contents, read in chunks
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(path: &Path) -> Result<Self, Error> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, path))?;

        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0; READ_BUF];
        loop {
            match file.read(&mut buf).await? {
                0 => break,
                n => {
                    hasher.update(&buf[..n]);
                }
            }
        }
        Ok(hasher.finalize().into())
    }
}

impl From<blake3::Hash> for Hash {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl FromStr for Hash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| format!("invalid digest {s:?}: {e}"))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let expected = "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24";
        assert_eq!(Hash::from_data(b"hello world").to_hex(), expected);
    }

    #[test]
    fn test_parse_sidecar() {
        let hash = Hash::from_data(b"pkg");
        let origin = Path::new("/store/pkg_shasum");

        let parsed = Hash::parse_sidecar(&format!("{hash}\n"), origin).unwrap();
        assert_eq!(parsed, hash);

        let err = Hash::parse_sidecar("not-a-digest", origin).unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::DigestUnreadable { ref path, .. }) if path == "/store/pkg_shasum"
        ));
        assert!(Hash::parse_sidecar(&hash.to_hex()[..40], origin).is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = Hash::from_data(b"test");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        assert_eq!(serde_json::from_str::<Hash>(&json).unwrap(), hash);
    }

    #[tokio::test]
    async fn test_hash_file_matches_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        tokio::fs::write(&path, b"module.exports = 1;\n").await.unwrap();

        let hash = Hash::hash_file(&path).await.unwrap();
        assert_eq!(hash, Hash::from_data(b"module.exports = 1;\n"));

        let missing = Hash::hash_file(&dir.path().join("nope")).await;
        assert!(matches!(
            missing,
            Err(Error::Storage(StorageError::PathNotFound { .. }))
        ));
    }
}
