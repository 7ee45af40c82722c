//! The transport seam and its dispatcher

use crate::{DirectoryTransport, GitTransport, NetClient, TarballTransport};
use std::path::Path;
use std::sync::Arc;
use stowage_errors::{Error, InstallError};
use stowage_types::Resolution;

/// Per-call knobs passed through to transports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Hard-link files of directory resolutions instead of copying them
    pub link_local: bool,
}

/// Moves the bytes described by a [`Resolution`] into a directory
///
/// On failure `dest` may be left partially populated; the caller discards
/// it before the next attempt.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        resolution: &Resolution,
        dest: &Path,
        opts: &TransportOptions,
    ) -> Result<(), Error>;
}

/// Picks a transport from the resolution's `type`
#[derive(Clone)]
pub struct TransportRouter {
    tarball: Arc<dyn Transport>,
    directory: Arc<dyn Transport>,
    git: Arc<dyn Transport>,
}

impl TransportRouter {
    #[must_use]
    pub fn new(client: NetClient) -> Self {
        Self {
            tarball: Arc::new(TarballTransport::new(client)),
            directory: Arc::new(DirectoryTransport),
            git: Arc::new(GitTransport::default()),
        }
    }

    /// Router with a default HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self, Error> {
        Ok(Self::new(NetClient::with_defaults()?))
    }

    #[must_use]
    pub fn with_tarball(mut self, transport: Arc<dyn Transport>) -> Self {
        self.tarball = transport;
        self
    }

    #[must_use]
    pub fn with_directory(mut self, transport: Arc<dyn Transport>) -> Self {
        self.directory = transport;
        self
    }

    #[must_use]
    pub fn with_git(mut self, transport: Arc<dyn Transport>) -> Self {
        self.git = transport;
        self
    }

    fn route(&self, resolution: &Resolution) -> &Arc<dyn Transport> {
        match resolution {
            Resolution::Tarball { .. } => &self.tarball,
            Resolution::Directory { .. } => &self.directory,
            Resolution::Git { .. } => &self.git,
        }
    }
}

#[async_trait::async_trait]
impl Transport for TransportRouter {
    async fn fetch(
        &self,
        resolution: &Resolution,
        dest: &Path,
        opts: &TransportOptions,
    ) -> Result<(), Error> {
        tracing::debug!(kind = resolution.kind(), source = %resolution, dest = %dest.display(), "transport fetch");
        self.route(resolution).fetch(resolution, dest, opts).await
    }
}

/// Error for a transport handed a resolution it does not serve
pub(crate) fn unsupported(resolution: &Resolution) -> Error {
    InstallError::UnsupportedResolution {
        kind: resolution.kind().to_string(),
    }
    .into()
}
