//! Errors raised while obtaining archive bytes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::ErrorKind;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while fetching a manifest or an archive.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// The request could not be completed.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The request did not finish in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The release manifest could not be understood.
    #[error("invalid release manifest from {url}: {reason}")]
    ManifestInvalid { url: String, reason: String },

    /// A local archive file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Standard input could not be read.
    #[error("failed to read archive from standard input: {0}")]
    Stdin(#[source] io::Error),
}

impl FetchError {
    /// Classify the error. Every fetch failure is a transfer error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transfer
    }
}
