#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Fetch orchestration for stowage
//!
//! [`PackageFetcher::fetch`] resolves a package spec (or reuses a locked
//! resolution), records the outcome in the [`Shrinkwrap`] map and submits
//! the store commit through a [`FetchLocker`], so that concurrent requests
//! for the same package id share a single transfer. The returned
//! [`FetchedPackage`] exposes the manifest and the file fetch as clonable
//! futures.

mod fetch;
mod handle;
mod locker;
mod options;
mod shrinkwrap;

pub use fetch::PackageFetcher;
pub use handle::FetchedPackage;
pub use locker::{FetchLocker, SharedResult};
pub use options::{FetchOptions, LockedResolution};
pub use shrinkwrap::{Shrinkwrap, ShrinkwrapEntry};
