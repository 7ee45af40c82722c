use crate::transport::unsupported;
use crate::{Transport, TransportOptions};
use std::path::Path;
use stowage_errors::Error;
use stowage_types::Resolution;

/// Copies (or hard-links) a local package directory
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryTransport;

#[async_trait::async_trait]
impl Transport for DirectoryTransport {
    async fn fetch(
        &self,
        resolution: &Resolution,
        dest: &Path,
        opts: &TransportOptions,
    ) -> Result<(), Error> {
        let Resolution::Directory { root } = resolution else {
            return Err(unsupported(resolution));
        };

        if opts.link_local {
            stowage_root::link_directory(root, dest).await
        } else {
            stowage_root::copy_directory(root, dest).await
        }
    }
}
