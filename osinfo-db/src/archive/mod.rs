//! Archive codec for database directories.
//!
//! A database archive is a tar stream (xz compressed when produced by
//! [`encode`]) whose entries all live below a single top-level directory
//! named after the database version:
//!
//! ```text
//! osinfo-db-20240101/
//! osinfo-db-20240101/VERSION
//! osinfo-db-20240101/LICENSE
//! osinfo-db-20240101/os/
//! osinfo-db-20240101/os/fedoraproject.org/fedora-39.xml
//! ```
//!
//! [`decode`] strips that directory again, so decoded entry paths are
//! relative to the database root. Decoding never touches the filesystem.

mod decode;
mod encode;
mod error;
mod naming;

pub use decode::{decode, ArchiveFormat};
pub use encode::{encode, EncodeOptions, EncodedArchive};
pub use error::{ArchiveError, ArchiveResult};
pub use naming::{
    archive_filename, date_version, generated_version, root_dir_name, ARCHIVE_EXTENSION,
    ARCHIVE_PREFIX, LICENSE_FILE, VERSION_FILE,
};

use std::path::PathBuf;

/// Content of a single archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file and its bytes.
    File(Vec<u8>),
    /// A directory.
    Directory,
}

/// One file or directory of a database tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path relative to the database root. Never absolute, never contains `..`.
    pub path: PathBuf,
    /// File bytes or directory marker.
    pub kind: EntryKind,
}

impl ArchiveEntry {
    /// A regular file entry.
    pub fn file(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File(contents.into()),
        }
    }

    /// A directory entry.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// File contents, or `None` for directories.
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.kind {
            EntryKind::File(bytes) => Some(bytes),
            EntryKind::Directory => None,
        }
    }

    /// The one-letter tag used in verbose listings: `r` for files, `d` for
    /// directories.
    pub fn tag(&self) -> char {
        if self.is_dir() {
            'd'
        } else {
            'r'
        }
    }
}

/// Version recorded in a list of entries, if it carries a top-level VERSION file.
pub fn entries_version(entries: &[ArchiveEntry]) -> Option<String> {
    entries
        .iter()
        .find(|entry| entry.path.as_os_str() == VERSION_FILE)
        .and_then(|entry| entry.contents())
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_tags() {
        assert_eq!(ArchiveEntry::file("a.xml", b"x".to_vec()).tag(), 'r');
        assert_eq!(ArchiveEntry::directory("os").tag(), 'd');
    }

    #[test]
    fn test_entries_version() {
        let entries = vec![
            ArchiveEntry::directory("os"),
            ArchiveEntry::file("VERSION", b"20240101\n".to_vec()),
        ];
        assert_eq!(entries_version(&entries).as_deref(), Some("20240101"));
        assert_eq!(entries_version(&entries[..1]), None);
    }
}
