//! Building `.tar.xz` archives from a database directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tar::{Builder, EntryType, Header};
use walkdir::WalkDir;
use xz2::write::XzEncoder;

use super::error::{ArchiveError, ArchiveResult};
use super::naming::{
    archive_filename, generated_version, root_dir_name, LICENSE_FILE, VERSION_FILE,
};
use super::{ArchiveEntry, EntryKind};

/// xz preset used for exported archives.
const XZ_PRESET: u32 = 6;

const FILE_MODE: u32 = 0o644;
const DIR_MODE: u32 = 0o755;

/// Options controlling archive creation.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Version to stamp into the archive, replacing any existing VERSION file.
    pub version: Option<String>,
    /// File to archive as the top-level LICENSE.
    pub license: Option<PathBuf>,
    /// Modification time for every entry, seconds since the epoch.
    ///
    /// Defaults to the time of encoding.
    pub mtime: Option<u64>,
}

impl EncodeOptions {
    /// Options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the license file.
    pub fn with_license(mut self, license: impl Into<PathBuf>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Set a fixed entry modification time.
    pub fn with_mtime(mut self, mtime: u64) -> Self {
        self.mtime = Some(mtime);
        self
    }
}

/// A compressed archive held in memory.
#[derive(Debug, Clone)]
pub struct EncodedArchive {
    /// The `.tar.xz` stream.
    pub bytes: Vec<u8>,
    /// Version recorded in the archive.
    pub version: String,
    /// Label naming the archive root directory and the default filename.
    ///
    /// The explicit version when it is a single path component, otherwise
    /// the date of the run.
    pub label: String,
    /// Number of entries, directories included, below the archive root.
    pub entry_count: usize,
}

impl EncodedArchive {
    /// Filename this archive gets when no output is named.
    pub fn default_filename(&self) -> String {
        archive_filename(&self.label)
    }
}

/// Encode `source` into an xz-compressed tar archive.
///
/// Every regular file and directory below `source` is archived in sorted
/// order. Symlinks to files and directories are followed.
pub fn encode(source: &Path, options: &EncodeOptions) -> ArchiveResult<EncodedArchive> {
    check_source(source)?;

    let license = match &options.license {
        Some(path) => Some(fs::read(path).map_err(|e| ArchiveError::LicenseUnreadable {
            path: path.clone(),
            source: e,
        })?),
        None => None,
    };

    let mut entries = collect_entries(source, options.version.is_some(), license.is_some())?;

    let run_date = generated_version();
    let version = match &options.version {
        Some(version) => {
            entries.insert(0, ArchiveEntry::file(VERSION_FILE, version.as_bytes().to_vec()));
            version.clone()
        }
        None => match super::entries_version(&entries) {
            Some(existing) => existing,
            None => {
                entries.insert(0, ArchiveEntry::file(VERSION_FILE, run_date.as_bytes().to_vec()));
                run_date.clone()
            }
        },
    };

    if let Some(license) = license {
        let at = entries.len().min(1);
        entries.insert(at, ArchiveEntry::file(LICENSE_FILE, license));
    }

    let label = options
        .version
        .as_deref()
        .filter(|v| usable_label(v))
        .map(str::to_owned)
        .unwrap_or(run_date);

    let mtime = options.mtime.unwrap_or_else(now_secs);
    let bytes = write_archive(&root_dir_name(&label), &entries, mtime)
        .map_err(ArchiveError::EncodeFailed)?;

    tracing::debug!(
        source = %source.display(),
        version = %version,
        entries = entries.len(),
        bytes = bytes.len(),
        "encoded archive"
    );

    Ok(EncodedArchive {
        bytes,
        version,
        label,
        entry_count: entries.len(),
    })
}

fn check_source(source: &Path) -> ArchiveResult<()> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ArchiveError::SourceNotDirectory {
            path: source.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ArchiveError::SourceMissing {
            path: source.to_path_buf(),
        }),
        Err(e) => Err(ArchiveError::ReadFailed {
            path: source.to_path_buf(),
            source: e,
        }),
    }
}

/// Walk `source` and load every entry into memory.
fn collect_entries(
    source: &Path,
    skip_version: bool,
    skip_license: bool,
) -> ArchiveResult<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(source)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));

        if entry.depth() == 1
            && ((skip_version && rel.as_os_str() == VERSION_FILE)
                || (skip_license && rel.as_os_str() == LICENSE_FILE))
        {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            tracing::debug!("d {}", rel.display());
            entries.push(ArchiveEntry::directory(rel));
        } else if file_type.is_file() {
            let contents = fs::read(entry.path()).map_err(|e| ArchiveError::ReadFailed {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            tracing::debug!("r {}", rel.display());
            entries.push(ArchiveEntry::file(rel, contents));
        } else {
            return Err(ArchiveError::UnsupportedFile {
                path: entry.path().to_path_buf(),
            });
        }
    }

    Ok(entries)
}

/// Whether a version can name the archive root directory.
fn usable_label(version: &str) -> bool {
    !version.is_empty()
        && !version.contains(['/', '\\'])
        && version != "."
        && version != ".."
}

fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

fn write_archive(root: &str, entries: &[ArchiveEntry], mtime: u64) -> io::Result<Vec<u8>> {
    let encoder = XzEncoder::new(Vec::new(), XZ_PRESET);
    let mut builder = Builder::new(encoder);

    append_directory(&mut builder, Path::new(root), mtime)?;
    for entry in entries {
        let path = Path::new(root).join(&entry.path);
        match &entry.kind {
            EntryKind::Directory => append_directory(&mut builder, &path, mtime)?,
            EntryKind::File(contents) => {
                let mut header = base_header(mtime);
                header.set_entry_type(EntryType::Regular);
                header.set_mode(FILE_MODE);
                header.set_size(contents.len() as u64);
                builder.append_data(&mut header, &path, contents.as_slice())?;
            }
        }
    }

    let mut encoder = builder.into_inner()?;
    encoder.flush()?;
    encoder.finish()
}

fn append_directory<W: Write>(builder: &mut Builder<W>, path: &Path, mtime: u64) -> io::Result<()> {
    let mut header = base_header(mtime);
    header.set_entry_type(EntryType::Directory);
    header.set_mode(DIR_MODE);
    header.set_size(0);
    builder.append_data(&mut header, path, io::empty())
}

fn base_header(mtime: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_mtime(mtime);
    header.set_uid(0);
    header.set_gid(0);
    header
}
