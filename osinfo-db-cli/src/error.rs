//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::io;
use std::process;

use osinfo_db::export::ExportError;
use osinfo_db::fetch::FetchError;
use osinfo_db::install::InstallError;
use osinfo_db::ErrorKind;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Failed to set up the HTTP client
    Fetch(FetchError),
    /// Export failed
    Export(ExportError),
    /// Import failed
    Import(InstallError),
    /// One or more entries failed validation
    Validation { failed: usize, checked: usize },
    /// Failed to write command output
    Output(io::Error),
}

impl CliError {
    /// Broad category of the error, if it came from the library.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CliError::Fetch(e) => Some(e.kind()),
            CliError::Export(e) => Some(e.kind()),
            CliError::Import(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        tracing::debug!(kind = ?self.kind(), "command failed");
        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Fetch(e) => write!(f, "{}", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
            CliError::Import(e) => write!(f, "Import failed: {}", e),
            CliError::Validation { failed, checked } => write!(
                f,
                "{} of {} entries failed validation",
                failed, checked
            ),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Fetch(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::Import(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}

impl From<InstallError> for CliError {
    fn from(e: InstallError) -> Self {
        CliError::Import(e)
    }
}
