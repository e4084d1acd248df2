//! Error types for the installer.

use std::io;
use std::path::PathBuf;

use crate::archive::ArchiveError;
use crate::error::ErrorKind;
use crate::fetch::FetchError;

/// Result type for install operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// Errors that can occur while importing an archive.
#[derive(Debug)]
pub enum InstallError {
    /// The archive could not be obtained.
    Fetch(FetchError),

    /// The archive could not be decoded.
    Archive(ArchiveError),

    /// The target path exists but is not a directory.
    TargetNotDirectory { path: PathBuf },

    /// The target path cannot be installed into.
    InvalidTarget { path: PathBuf, reason: String },

    /// Failed to read part of the existing target tree.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file into the staging area.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Moving the staged tree into place failed.
    SwapFailed { target: PathBuf, source: io::Error },
}

impl InstallError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(e) => e.kind(),
            Self::Archive(e) => e.kind(),
            Self::TargetNotDirectory { .. } | Self::InvalidTarget { .. } => ErrorKind::Usage,
            Self::ReadFailed { .. }
            | Self::CreateDirFailed { .. }
            | Self::WriteFailed { .. }
            | Self::SwapFailed { .. } => ErrorKind::Transfer,
        }
    }
}

impl std::fmt::Display for InstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "{}", e),
            Self::Archive(e) => write!(f, "{}", e),
            Self::TargetNotDirectory { path } => {
                write!(f, "target {} is not a directory", path.display())
            }
            Self::InvalidTarget { path, reason } => {
                write!(f, "cannot install into {}: {}", path.display(), reason)
            }
            Self::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::SwapFailed { target, source } => {
                write!(
                    f,
                    "failed to move staged database into {}: {}",
                    target.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Archive(e) => Some(e),
            Self::ReadFailed { source, .. } => Some(source),
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::SwapFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FetchError> for InstallError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<ArchiveError> for InstallError {
    fn from(e: ArchiveError) -> Self {
        Self::Archive(e)
    }
}
