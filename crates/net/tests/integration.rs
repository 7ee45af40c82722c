//! Integration tests for net crate

use async_compression::tokio::bufread::GzipEncoder;
use httpmock::prelude::*;
use sha1::{Digest, Sha1};
use std::path::Path;
use std::time::Duration;
use stowage_errors::{Error, NetworkError};
use stowage_net::*;
use stowage_types::Resolution;
use tempfile::tempdir;
use tokio::io::AsyncReadExt;

/// Gzipped npm-style tarball with everything under `package/`
async fn npm_tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("package/{name}"), content.as_bytes())
            .unwrap();
    }
    gzip(builder.into_inner().unwrap()).await
}

async fn gzip(raw: Vec<u8>) -> Vec<u8> {
    let mut gz = Vec::new();
    GzipEncoder::new(raw.as_slice())
        .read_to_end(&mut gz)
        .await
        .unwrap();
    gz
}

fn fast_client() -> NetClient {
    NetClient::new(NetConfig {
        retry_count: 2,
        retry_delay: Duration::from_millis(1),
        timeout: Duration::from_secs(10),
        ..NetConfig::default()
    })
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_tarball_unpacks_without_top_level_dir() {
    let server = MockServer::start();
    let body = npm_tarball(&[
        ("package.json", r#"{"name":"a","version":"1.0.0"}"#),
        ("lib/index.js", "module.exports = 1;\n"),
    ])
    .await;
    let shasum = hex::encode(Sha1::digest(&body));

    let mock = server.mock(|when, then| {
        when.method(GET).path("/a/-/a-1.0.0.tgz");
        then.status(200).body(body.clone());
    });

    let temp = tempdir().unwrap();
    let dest = temp.path().join("stage");
    let resolution = Resolution::Tarball {
        tarball: server.url("/a/-/a-1.0.0.tgz"),
        shasum: Some(shasum),
    };

    TransportRouter::new(fast_client())
        .fetch(&resolution, &dest, &TransportOptions::default())
        .await
        .unwrap();

    mock.assert();
    assert!(dest.join("package.json").is_file());
    assert_eq!(
        tokio::fs::read_to_string(dest.join("lib/index.js"))
            .await
            .unwrap(),
        "module.exports = 1;\n"
    );
    assert!(!dest.join("package").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shasum_mismatch_is_rejected() {
    let server = MockServer::start();
    let body = npm_tarball(&[("package.json", "{}")]).await;
    server.mock(|when, then| {
        when.method(GET).path("/b.tgz");
        then.status(200).body(body.clone());
    });

    let temp = tempdir().unwrap();
    let dest = temp.path().join("stage");
    let resolution = Resolution::Tarball {
        tarball: server.url("/b.tgz"),
        shasum: Some("0000000000000000000000000000000000000000".into()),
    };

    let err = TarballTransport::new(fast_client())
        .fetch(&resolution, &dest, &TransportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Network(NetworkError::ChecksumMismatch { .. })
    ));
    assert!(!dest.join("package.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_errors_are_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/flaky.tgz");
        then.status(503);
    });

    let temp = tempdir().unwrap();
    let resolution = Resolution::Tarball {
        tarball: server.url("/flaky.tgz"),
        shasum: None,
    };
    let err = TarballTransport::new(fast_client())
        .fetch(&resolution, &temp.path().join("stage"), &TransportOptions::default())
        .await
        .unwrap_err();

    // initial attempt plus two retries
    mock.assert_hits(3);
    assert!(matches!(
        err,
        Error::Network(NetworkError::HttpError { status: 503, .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing.tgz");
        then.status(404);
    });

    let temp = tempdir().unwrap();
    let resolution = Resolution::Tarball {
        tarball: server.url("/missing.tgz"),
        shasum: None,
    };
    assert!(TarballTransport::new(fast_client())
        .fetch(&resolution, &temp.path().join("stage"), &TransportOptions::default())
        .await
        .is_err());
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_file_tarball() {
    let temp = tempdir().unwrap();
    let archive = temp.path().join("c.tgz");
    tokio::fs::write(&archive, npm_tarball(&[("index.js", "x")]).await)
        .await
        .unwrap();

    let dest = temp.path().join("stage");
    let resolution = Resolution::Tarball {
        tarball: format!("file:{}", archive.display()),
        shasum: None,
    };
    TarballTransport::new(fast_client())
        .fetch(&resolution, &dest, &TransportOptions::default())
        .await
        .unwrap();
    assert!(dest.join("index.js").is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn test_tarball_symlink_cannot_redirect_entries() {
    let temp = tempdir().unwrap();
    let outside = tempdir().unwrap();

    let mut builder = tar::Builder::new(Vec::new());
    let mut link = tar::Header::new_gnu();
    link.set_entry_type(tar::EntryType::Symlink);
    link.set_size(0);
    link.set_mode(0o777);
    builder
        .append_link(&mut link, "package/evil", outside.path())
        .unwrap();
    let content = b"owned";
    let mut file = tar::Header::new_gnu();
    file.set_size(content.len() as u64);
    file.set_mode(0o644);
    file.set_cksum();
    builder
        .append_data(&mut file, "package/evil/pwned.txt", &content[..])
        .unwrap();

    let archive = temp.path().join("evil.tgz");
    tokio::fs::write(&archive, gzip(builder.into_inner().unwrap()).await)
        .await
        .unwrap();

    let dest = temp.path().join("stage");
    let resolution = Resolution::Tarball {
        tarball: format!("file:{}", archive.display()),
        shasum: None,
    };
    let err = TarballTransport::new(fast_client())
        .fetch(&resolution, &dest, &TransportOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::UnpackFailed { .. })
    ));
    assert!(!outside.path().join("pwned.txt").exists());
}

async fn local_package(root: &Path) {
    tokio::fs::create_dir_all(root.join("lib")).await.unwrap();
    tokio::fs::write(root.join("package.json"), b"{}").await.unwrap();
    tokio::fs::write(root.join("lib/a.js"), b"a").await.unwrap();
}

#[tokio::test]
async fn test_directory_copy_and_link() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("src");
    local_package(&source).await;
    let resolution = Resolution::Directory {
        root: source.clone(),
    };

    let copied = temp.path().join("copied");
    DirectoryTransport
        .fetch(&resolution, &copied, &TransportOptions { link_local: false })
        .await
        .unwrap();
    assert!(copied.join("lib/a.js").is_file());

    let linked = temp.path().join("linked");
    DirectoryTransport
        .fetch(&resolution, &linked, &TransportOptions { link_local: true })
        .await
        .unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let a = std::fs::metadata(source.join("lib/a.js")).unwrap();
        let b = std::fs::metadata(linked.join("lib/a.js")).unwrap();
        assert_eq!(a.ino(), b.ino());
    }
}

#[tokio::test]
async fn test_transport_rejects_foreign_resolution() {
    let temp = tempdir().unwrap();
    let resolution = Resolution::Git {
        repo: "https://example.invalid/repo.git".into(),
        commit: "abc".into(),
    };
    assert!(DirectoryTransport
        .fetch(&resolution, temp.path(), &TransportOptions::default())
        .await
        .is_err());
}
