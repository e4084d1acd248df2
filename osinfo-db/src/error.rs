//! Error classification shared by all operations.
//!
//! Each module owns its error enum. This module only defines the broad
//! category every error falls into, which callers use to pick diagnostics.

use std::fmt;

/// Broad category of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments or an unusable source or target directory.
    ///
    /// Raised before any filesystem write is attempted.
    Usage,

    /// Fetching, decoding or extracting an archive failed.
    ///
    /// The target directory is left untouched.
    Transfer,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Usage => write!(f, "usage error"),
            ErrorKind::Transfer => write!(f, "transfer error"),
        }
    }
}
