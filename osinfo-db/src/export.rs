//! Packaging a database directory into an archive file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::archive::{self, ArchiveError, EncodeOptions, EncodedArchive};
use crate::error::ErrorKind;
use crate::paths::{Environment, Location};

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The directory could not be archived.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The archive file could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// The archive could not be written to standard output.
    #[error("failed to write archive to standard output: {0}")]
    Stdout(#[source] io::Error),
}

impl ExportError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Archive(e) => e.kind(),
            Self::WriteFailed { .. } | Self::Stdout(_) => ErrorKind::Usage,
        }
    }
}

/// Where an exported archive is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveDestination {
    /// Standard output.
    Stdout,
    /// A named file.
    File(PathBuf),
    /// `osinfo-db-<version>.tar.xz` inside a directory.
    DefaultName { dir: PathBuf },
}

impl ArchiveDestination {
    /// Interpret a command-line output argument.
    ///
    /// `-` means standard output; no argument means the default filename
    /// in the current directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use osinfo_db::export::ArchiveDestination;
    ///
    /// assert_eq!(ArchiveDestination::from_arg(Some("-")), ArchiveDestination::Stdout);
    /// assert_eq!(
    ///     ArchiveDestination::from_arg(Some("db.tar.xz")),
    ///     ArchiveDestination::File(PathBuf::from("db.tar.xz"))
    /// );
    /// assert_eq!(
    ///     ArchiveDestination::from_arg(None),
    ///     ArchiveDestination::DefaultName { dir: PathBuf::from(".") }
    /// );
    /// ```
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("-") => Self::Stdout,
            Some(path) => Self::File(PathBuf::from(path)),
            None => Self::DefaultName {
                dir: PathBuf::from("."),
            },
        }
    }
}

/// Summary of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Directory that was archived.
    pub source: PathBuf,
    /// File the archive was written to, or `None` for standard output.
    pub output: Option<PathBuf>,
    /// Version recorded in the archive.
    pub version: String,
    /// Number of entries below the archive root.
    pub entries: usize,
    /// Size of the compressed archive.
    pub bytes: usize,
}

/// Exports database directories as archives.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: EncodeOptions,
}

impl Exporter {
    /// Create an exporter with the given encode options.
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// The encode options in use.
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Resolve `location` and export it.
    pub fn export(
        &self,
        location: &Location,
        env: &Environment,
        destination: &ArchiveDestination,
    ) -> ExportResult<ExportReport> {
        let resolved = location.resolve(env);
        self.export_dir(&resolved.path, destination)
    }

    /// Export `source`, writing to the process's standard output for
    /// [`ArchiveDestination::Stdout`].
    pub fn export_dir(
        &self,
        source: &Path,
        destination: &ArchiveDestination,
    ) -> ExportResult<ExportReport> {
        self.export_dir_to(source, destination, io::stdout().lock())
    }

    /// Export `source`, using `stdout` for [`ArchiveDestination::Stdout`].
    pub fn export_dir_to<W: Write>(
        &self,
        source: &Path,
        destination: &ArchiveDestination,
        mut stdout: W,
    ) -> ExportResult<ExportReport> {
        let archive = archive::encode(source, &self.options)?;

        let output = match destination {
            ArchiveDestination::Stdout => {
                stdout
                    .write_all(&archive.bytes)
                    .and_then(|_| stdout.flush())
                    .map_err(ExportError::Stdout)?;
                None
            }
            ArchiveDestination::File(path) => {
                write_atomic(path, &archive)?;
                Some(path.clone())
            }
            ArchiveDestination::DefaultName { dir } => {
                let path = dir.join(archive.default_filename());
                write_atomic(&path, &archive)?;
                Some(path)
            }
        };

        let report = ExportReport {
            source: source.to_path_buf(),
            output,
            version: archive.version,
            entries: archive.entry_count,
            bytes: archive.bytes.len(),
        };
        tracing::info!(
            source = %report.source.display(),
            output = %report
                .output
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            version = %report.version,
            "export complete"
        );
        Ok(report)
    }
}

/// Write the archive through a temporary file in the destination directory
/// and rename it into place.
fn write_atomic(path: &Path, archive: &EncodedArchive) -> ExportResult<()> {
    let write_err = |e: io::Error| ExportError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(&archive.bytes).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
