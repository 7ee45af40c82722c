#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package resolution seam for stowage
//!
//! A [`Resolver`] turns a [`PackageSpec`] into a store identifier plus a
//! [`Resolution`] describing where the bytes live. Registry and git-host
//! resolvers are supplied by the embedding application; this crate ships the
//! trait, the context handed to it, a metadata cache shared between
//! resolvers, and a resolver for local directories.

mod cache;
mod chain;
mod directory;

pub use cache::{DistInfo, MetaCache, PackageMeta, VersionMeta};
pub use chain::ResolverChain;
pub use directory::DirectoryResolver;

use std::path::PathBuf;
use stowage_errors::Error;
use stowage_types::{LoggedPackage, PackageId, PackageManifest, PackageSpec, Resolution};

/// Inputs a resolver may consult besides the spec itself
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// Project root; relative local specs are resolved against it
    pub root: PathBuf,
    /// Dist-tag used when the spec names no version (`latest`, `next`, ...)
    pub tag: String,
    pub store_path: PathBuf,
    pub meta_cache: MetaCache,
    pub logged_package: LoggedPackage,
}

/// What a resolver hands back
#[derive(Debug, Clone)]
pub struct ResolveResult {
    pub id: PackageId,
    pub resolution: Resolution,
    /// Manifest, when it could be read without fetching into the store
    pub package: Option<PackageManifest>,
}

#[async_trait::async_trait]
pub trait Resolver: Send + Sync {
    /// Whether this resolver understands `spec` at all
    fn can_resolve(&self, _spec: &PackageSpec) -> bool {
        true
    }

    /// Resolve `spec` to an identifier and resolution
    ///
    /// Must be deterministic for a given spec and context, modulo tag
    /// semantics.
    async fn resolve(&self, spec: &PackageSpec, ctx: &ResolveContext)
        -> Result<ResolveResult, Error>;
}
