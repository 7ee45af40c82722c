//! Integration tests for store crate

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stowage_errors::{Error, NetworkError};
use stowage_events::{channel, AppEvent, EventReceiver, FetchEvent, FetchStatus};
use stowage_net::{Transport, TransportOptions};
use stowage_store::*;
use stowage_types::{LoggedPackage, PackageId, PackageSpec, Resolution};
use tempfile::tempdir;

/// Writes a fixed two-file package and counts invocations
#[derive(Default)]
struct CountingTransport {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait::async_trait]
impl Transport for CountingTransport {
    async fn fetch(
        &self,
        _resolution: &Resolution,
        dest: &Path,
        _opts: &TransportOptions,
    ) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::create_dir_all(dest.join("lib")).await?;
        tokio::fs::write(dest.join("package.json"), br#"{"name":"a","version":"1.0.0"}"#)
            .await?;
        if self.fail {
            return Err(NetworkError::DownloadFailed("connection reset".into()).into());
        }
        tokio::fs::write(dest.join("lib/index.js"), b"module.exports = 1;\n").await?;
        Ok(())
    }
}

fn resolution() -> Resolution {
    Resolution::Tarball {
        tarball: "https://registry.example/a/-/a-1.0.0.tgz".into(),
        shasum: None,
    }
}

fn logged() -> LoggedPackage {
    LoggedPackage::from(&PackageSpec::parse("a@1.0.0").unwrap())
}

fn statuses(rx: &mut EventReceiver) -> Vec<FetchStatus> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let AppEvent::Fetch(FetchEvent::Status { status, .. }) = message.event {
            out.push(status);
        }
    }
    out
}

#[tokio::test]
async fn test_cold_then_warm_commit() {
    let store = tempdir().unwrap();
    let target = store.path().join("registry.example/a/1.0.0");
    let transport = Arc::new(CountingTransport::default());
    let (tx, mut rx) = channel();
    let committer = StoreCommitter::new(transport.clone()).with_events(tx);

    let wrote = committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap();
    assert!(wrote);
    assert!(target.join("lib/index.js").is_file());
    assert!(shasum_path(&target).is_file());
    assert!(!stage_path(&target).exists());
    assert_eq!(
        statuses(&mut rx),
        vec![FetchStatus::DownloadQueued, FetchStatus::Committed]
    );

    let wrote = committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap();
    assert!(!wrote);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(statuses(&mut rx), vec![FetchStatus::FoundInStore]);
}

#[tokio::test]
async fn test_touched_entry_is_refetched() {
    let store = tempdir().unwrap();
    let target = store.path().join("a");
    let transport = Arc::new(CountingTransport::default());
    let (tx, mut rx) = channel();
    let committer = StoreCommitter::new(transport.clone()).with_events(tx);

    committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap();
    tokio::fs::write(target.join("lib/index.js"), b"tampered")
        .await
        .unwrap();
    tokio::fs::write(target.join("stray.txt"), b"x").await.unwrap();

    assert!(committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    assert!(!target.join("stray.txt").exists());
    assert!(is_untouched(&target).await);

    let mut saw_refetch = false;
    while let Ok(message) = rx.try_recv() {
        if matches!(message.event, AppEvent::Fetch(FetchEvent::Refetching { .. })) {
            saw_refetch = true;
        }
    }
    assert!(saw_refetch);
}

#[tokio::test]
async fn test_force_skips_fast_path() {
    let store = tempdir().unwrap();
    let target = store.path().join("a");
    let transport = Arc::new(CountingTransport::default());
    let committer = StoreCommitter::new(transport.clone());

    committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap();
    let forced = CommitOptions {
        force: true,
        ..CommitOptions::default()
    };
    assert!(committer
        .commit(&target, &resolution(), &logged(), forced)
        .await
        .unwrap());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_stale_stage_is_discarded() {
    let store = tempdir().unwrap();
    let target = store.path().join("a");
    let stage = stage_path(&target);
    tokio::fs::create_dir_all(&stage).await.unwrap();
    tokio::fs::write(stage.join("leftover.js"), b"half").await.unwrap();

    let committer = StoreCommitter::new(Arc::new(CountingTransport::default()));
    committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap();

    assert!(!target.join("leftover.js").exists());
    assert!(target.join("lib/index.js").is_file());
}

#[tokio::test]
async fn test_transport_failure_leaves_no_target() {
    let store = tempdir().unwrap();
    let target = store.path().join("a");
    let committer = StoreCommitter::new(Arc::new(CountingTransport {
        fail: true,
        ..CountingTransport::default()
    }));

    let err = committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(!target.exists());

    // the next attempt starts from a clean stage
    let committer = StoreCommitter::new(Arc::new(CountingTransport::default()));
    assert!(committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap());
    assert!(is_untouched(&target).await);
}

#[tokio::test]
async fn test_digest_write_failure_is_not_fatal() {
    let store = tempdir().unwrap();
    let target = store.path().join("a");
    // a directory where the sidecar file should go makes the write fail
    tokio::fs::create_dir_all(shasum_path(&target).join("blocker"))
        .await
        .unwrap();

    let (tx, mut rx) = channel();
    let committer = StoreCommitter::new(Arc::new(CountingTransport::default())).with_events(tx);
    assert!(committer
        .commit(&target, &resolution(), &logged(), CommitOptions::default())
        .await
        .unwrap());
    assert!(target.join("lib/index.js").is_file());
    assert!(!is_untouched(&target).await);

    let mut saw_digest_failure = false;
    while let Ok(message) = rx.try_recv() {
        if matches!(message.event, AppEvent::Fetch(FetchEvent::DigestFailed { .. })) {
            saw_digest_failure = true;
        }
    }
    assert!(saw_digest_failure);
}

#[tokio::test]
async fn test_package_store_status_and_remove() {
    let store_dir = tempdir().unwrap();
    let store = PackageStore::new(store_dir.path());
    let id = PackageId::new("registry.example/a/1.0.0").unwrap();
    assert_eq!(store.status(&id).await, EntryStatus::Missing);

    let committer = StoreCommitter::new(Arc::new(CountingTransport::default()));
    committer
        .commit(
            &store.package_path(&id),
            &resolution(),
            &logged(),
            CommitOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(store.status(&id).await, EntryStatus::Untouched);

    tokio::fs::write(store.package_path(&id).join("package.json"), b"{}")
        .await
        .unwrap();
    assert_eq!(store.status(&id).await, EntryStatus::Touched);

    tokio::fs::create_dir_all(store.layout().stage(&id))
        .await
        .unwrap();
    store.remove(&id).await.unwrap();
    assert_eq!(store.status(&id).await, EntryStatus::Missing);
    assert!(!store.layout().shasum(&id).exists());
    assert!(!store.layout().stage(&id).exists());
}
