#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the stowage fetch engine
//!
//! This crate provides the data model shared by the resolver, the
//! transports, the store and the fetch orchestrator: package specs,
//! store identifiers, resolutions and package manifests.

pub mod manifest;
pub mod package;
pub mod resolution;

// Re-export commonly used types
pub use manifest::PackageManifest;
pub use package::{LoggedPackage, PackageId, PackageSpec};
pub use resolution::Resolution;
pub use semver::Version;

/// Suffix of the digest sidecar written next to each store entry
pub const SHASUM_SUFFIX: &str = "_shasum";

/// Suffix of the transient staging directory used while committing
pub const STAGE_SUFFIX: &str = "_stage";
