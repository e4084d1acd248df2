//! Errors raised while encoding or decoding archives.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::ErrorKind;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while building or reading an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The directory to export does not exist.
    #[error("source directory {} does not exist", .path.display())]
    SourceMissing { path: PathBuf },

    /// The path to export is not a directory.
    #[error("{} is not a directory", .path.display())]
    SourceNotDirectory { path: PathBuf },

    /// The license file could not be read.
    #[error("failed to read license file {}: {source}", .path.display())]
    LicenseUnreadable { path: PathBuf, source: io::Error },

    /// A file below the source directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Walking the source directory failed.
    #[error("failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The source directory contains something other than files and directories.
    #[error("unsupported file type at {}", .path.display())]
    UnsupportedFile { path: PathBuf },

    /// Writing the compressed stream failed.
    #[error("failed to write archive: {0}")]
    EncodeFailed(#[source] io::Error),

    /// The stream is neither xz, gzip nor plain tar.
    #[error("unrecognised archive format")]
    UnknownFormat,

    /// The stream could not be decompressed or parsed.
    #[error("corrupt archive: {0}")]
    Corrupt(#[source] io::Error),

    /// An entry path is absolute or escapes the archive root.
    #[error("unsafe entry path {}", .path.display())]
    UnsafePath { path: PathBuf },

    /// An entry is not a regular file or directory.
    #[error("unsupported entry type for {}", .path.display())]
    UnsupportedEntry { path: PathBuf },

    /// A file sits at the top level instead of below the archive root.
    #[error("entry {} is outside the archive root directory", .path.display())]
    MissingRootDirectory { path: PathBuf },

    /// Entries use more than one top-level directory.
    #[error("archive has more than one root directory ({first} and {second})")]
    MultipleRoots { first: String, second: String },
}

impl ArchiveError {
    /// Classify the error.
    ///
    /// Problems with the local source tree are usage errors; anything wrong
    /// with the archive stream itself is a transfer error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceMissing { .. }
            | Self::SourceNotDirectory { .. }
            | Self::LicenseUnreadable { .. }
            | Self::ReadFailed { .. }
            | Self::Walk(_)
            | Self::UnsupportedFile { .. } => ErrorKind::Usage,
            Self::EncodeFailed(_)
            | Self::UnknownFormat
            | Self::Corrupt(_)
            | Self::UnsafePath { .. }
            | Self::UnsupportedEntry { .. }
            | Self::MissingRootDirectory { .. }
            | Self::MultipleRoots { .. } => ErrorKind::Transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_errors_are_usage() {
        let err = ArchiveError::SourceNotDirectory {
            path: PathBuf::from("/etc/hosts"),
        };
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.to_string(), "/etc/hosts is not a directory");
    }

    #[test]
    fn test_stream_errors_are_transfer() {
        assert_eq!(ArchiveError::UnknownFormat.kind(), ErrorKind::Transfer);
        let err = ArchiveError::UnsafePath {
            path: PathBuf::from("../etc/passwd"),
        };
        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert!(err.to_string().contains("../etc/passwd"));
    }
}
