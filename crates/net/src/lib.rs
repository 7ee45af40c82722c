#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Transports for stowage
//!
//! A transport populates a directory from a [`Resolution`]: registry
//! tarballs over HTTP (with retries and shasum verification), tarballs on
//! disk, local directories, and git commits.
//!
//! [`Resolution`]: stowage_types::Resolution

mod client;
mod directory;
mod git;
mod tarball;
mod transport;

pub use client::{NetClient, NetConfig};
pub use directory::DirectoryTransport;
pub use git::GitTransport;
pub use tarball::{verify_shasum, TarballTransport};
pub use transport::{Transport, TransportOptions, TransportRouter};
