//! Staged installation into a database directory.
//!
//! The new tree is assembled in a hidden sibling of the target and only
//! swapped into place once every file has been written and synced:
//!
//! ```text
//! parent/
//! ├── osinfo/                          (target, untouched until commit)
//! └── .osinfo-db-staging-XXXXXX/       (archive entries + existing files)
//! ```
//!
//! Commit renames the target to a backup, the staging directory to the
//! target, and then removes the backup.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::archive::{ArchiveEntry, EntryKind};

use super::error::{InstallError, InstallResult};

const STAGING_PREFIX: &str = ".osinfo-db-staging-";

/// Counts of what was written into a staging area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagedCounts {
    /// Files taken from the archive.
    pub files: usize,
    /// Directories taken from the archive.
    pub directories: usize,
    /// Files carried over from the existing target.
    pub preserved: usize,
}

/// A staging directory next to an install target.
///
/// Dropping it without calling [`StagingArea::commit`] removes the staged
/// tree and leaves the target alone.
pub struct StagingArea {
    dir: TempDir,
    target: PathBuf,
    counts: StagedCounts,
}

impl StagingArea {
    /// Create a staging directory on the same filesystem as `target`.
    ///
    /// `target` may not exist yet; its parent directories are created.
    pub fn create(target: &Path) -> InstallResult<Self> {
        let target = normalise_target(target)?;
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&parent).map_err(|e| InstallError::CreateDirFailed {
            path: parent.clone(),
            source: e,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| InstallError::CreateDirFailed {
                path: parent.clone(),
                source: e,
            })?;

        tracing::debug!(
            staging = %dir.path().display(),
            target = %target.display(),
            "created staging area"
        );

        Ok(Self {
            dir,
            target,
            counts: StagedCounts::default(),
        })
    }

    /// Path of the staging directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The directory the staged tree will replace.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// What has been staged so far.
    pub fn counts(&self) -> StagedCounts {
        self.counts
    }

    /// Write archive entries into the staging directory.
    ///
    /// Every file is synced to disk before this returns.
    pub fn write_entries(&mut self, entries: &[ArchiveEntry]) -> InstallResult<()> {
        for entry in entries {
            let dest = self.dir.path().join(&entry.path);
            match &entry.kind {
                EntryKind::Directory => {
                    create_dir(&dest)?;
                    tracing::debug!("d {}", entry.path.display());
                    self.counts.directories += 1;
                }
                EntryKind::File(contents) => {
                    if let Some(parent) = dest.parent() {
                        create_dir(parent)?;
                    }
                    write_synced(&dest, contents).map_err(|e| InstallError::WriteFailed {
                        path: dest.clone(),
                        source: e,
                    })?;
                    tracing::debug!("r {}", entry.path.display());
                    self.counts.files += 1;
                }
            }
        }
        Ok(())
    }

    /// Carry over everything in the current target that the archive does
    /// not replace.
    ///
    /// Files are hard-linked when possible and copied otherwise. Where the
    /// archive and the target disagree about an entry, the archive wins.
    pub fn merge_existing(&mut self) -> InstallResult<()> {
        if !self.target.is_dir() {
            return Ok(());
        }
        let target = self.target.clone();
        let staging = self.dir.path().to_path_buf();
        self.counts.preserved += merge_dir(&target, &staging)?;
        Ok(())
    }

    /// Swap the staged tree into place.
    pub fn commit(self) -> InstallResult<PathBuf> {
        let staging = self.dir.path().to_path_buf();
        let target = self.target.clone();

        copy_permissions(&target, &staging);
        sync_dir(&staging);

        let swap_err = |e: io::Error| InstallError::SwapFailed {
            target: target.clone(),
            source: e,
        };

        if fs::symlink_metadata(&target).is_ok() {
            let backup = backup_path(&target)?;
            fs::rename(&target, &backup).map_err(swap_err)?;

            if let Err(e) = fs::rename(&staging, &target) {
                if let Err(restore) = fs::rename(&backup, &target) {
                    tracing::error!(
                        backup = %backup.display(),
                        error = %restore,
                        "failed to restore previous database"
                    );
                }
                return Err(swap_err(e));
            }

            if let Err(e) = fs::remove_dir_all(&backup) {
                tracing::warn!(
                    backup = %backup.display(),
                    error = %e,
                    "failed to remove previous database"
                );
            }
        } else {
            fs::rename(&staging, &target).map_err(swap_err)?;
        }

        if let Some(parent) = target.parent() {
            sync_dir(parent);
        }

        // The staging path is gone after the rename, so dropping the guard
        // removes nothing.
        drop(self.dir);

        tracing::debug!(target = %target.display(), "staged database committed");
        Ok(target)
    }
}

/// Resolve symlinks and relative components of an existing target so the
/// swap replaces the real directory.
fn normalise_target(target: &Path) -> InstallResult<PathBuf> {
    let resolved = if target.exists() {
        fs::canonicalize(target).map_err(|e| InstallError::ReadFailed {
            path: target.to_path_buf(),
            source: e,
        })?
    } else {
        target.to_path_buf()
    };

    if resolved.file_name().is_none() {
        return Err(InstallError::InvalidTarget {
            path: target.to_path_buf(),
            reason: "path has no directory name".to_string(),
        });
    }
    Ok(resolved)
}

fn backup_path(target: &Path) -> InstallResult<PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| InstallError::InvalidTarget {
            path: target.to_path_buf(),
            reason: "path has no directory name".to_string(),
        })?;
    let backup = format!(
        ".{}.osinfo-db-old-{}",
        name.to_string_lossy(),
        std::process::id()
    );
    Ok(target.with_file_name(backup))
}

fn create_dir(path: &Path) -> InstallResult<()> {
    fs::create_dir_all(path).map_err(|e| InstallError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Recursively link `source` entries into `dest` where `dest` has no entry
/// of that name. Returns the number of files carried over.
fn merge_dir(source: &Path, dest: &Path) -> InstallResult<usize> {
    let read_err = |e: io::Error| InstallError::ReadFailed {
        path: source.to_path_buf(),
        source: e,
    };
    let mut preserved = 0;

    for entry in fs::read_dir(source).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry.file_type().map_err(read_err)?;

        match fs::symlink_metadata(&dest_path) {
            Ok(existing) => {
                if existing.is_dir() && file_type.is_dir() {
                    preserved += merge_dir(&source_path, &dest_path)?;
                }
            }
            Err(_) => {
                preserved += carry_over(&source_path, &dest_path, file_type)?;
            }
        }
    }

    Ok(preserved)
}

fn carry_over(source: &Path, dest: &Path, file_type: fs::FileType) -> InstallResult<usize> {
    let write_err = |e: io::Error| InstallError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    };

    if file_type.is_dir() {
        create_dir(dest)?;
        return merge_dir(source, dest);
    }

    if file_type.is_symlink() {
        copy_symlink(source, dest).map_err(write_err)?;
        return Ok(1);
    }

    if file_type.is_file() {
        if fs::hard_link(source, dest).is_err() {
            fs::copy(source, dest).map_err(write_err)?;
        }
        return Ok(1);
    }

    tracing::warn!(path = %source.display(), "skipping special file in target");
    Ok(0)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    std::os::unix::fs::symlink(link, dest)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest).map(|_| ())
}

/// Give the staged root the target's permissions, or the usual directory
/// permissions for a new target. Staging directories start out private.
#[cfg(unix)]
fn copy_permissions(target: &Path, staging: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let permissions = fs::metadata(target)
        .map(|meta| meta.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(0o755));
    if let Err(e) = fs::set_permissions(staging, permissions) {
        tracing::warn!(path = %staging.display(), error = %e, "failed to set permissions");
    }
}

#[cfg(not(unix))]
fn copy_permissions(_target: &Path, _staging: &Path) {}

/// Flush directory metadata. Not every platform can open a directory for
/// syncing, so failures are ignored.
fn sync_dir(path: &Path) {
    if let Ok(dir) = File::open(path) {
        let _ = dir.sync_all();
    }
}
