//! osinfo-db - layered OS information database management
//!
//! This library provides the core operations behind the `osinfo-db` tools:
//!
//! - [`paths`]: resolving the system, local, user or explicit database directory
//! - [`archive`]: encoding a database directory as a `.tar.xz` archive and back
//! - [`fetch`]: obtaining archive bytes from files, stdin, URLs or release channels
//! - [`install`]: staged, all-or-nothing import of an archive into a directory
//! - [`export`]: packaging a resolved directory into an archive
//! - [`validate`]: structural validation of every entry in a directory
//!
//! Every operation is synchronous. A command resolves a directory through
//! [`paths::Location`] and then hands it to the exporter, installer or validator.

pub mod archive;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod install;
pub mod logging;
pub mod paths;
pub mod validate;

pub use error::ErrorKind;
