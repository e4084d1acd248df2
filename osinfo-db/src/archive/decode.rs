//! Reading archives back into entries.

use std::borrow::Cow;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tar::{Archive, EntryType};
use xz2::read::XzDecoder;

use super::error::{ArchiveError, ArchiveResult};
use super::ArchiveEntry;

const XZ_MAGIC: &[u8] = &[0xFD, b'7', b'z', b'X', b'Z', 0x00];
const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];
const USTAR_MAGIC: &[u8] = b"ustar";
const USTAR_OFFSET: usize = 257;

/// Container formats recognised by [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// xz-compressed tar.
    Xz,
    /// gzip-compressed tar.
    Gzip,
    /// Uncompressed tar.
    Tar,
}

impl ArchiveFormat {
    /// Sniff the format from the leading bytes of a stream.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(XZ_MAGIC) {
            Some(Self::Xz)
        } else if bytes.starts_with(GZIP_MAGIC) {
            Some(Self::Gzip)
        } else if bytes
            .get(USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len())
            .is_some_and(|magic| magic == USTAR_MAGIC)
        {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Decode an archive into its entries.
///
/// The stream is decompressed and parsed completely before anything is
/// returned. Entry paths have the archive's top-level directory removed.
pub fn decode(bytes: &[u8]) -> ArchiveResult<Vec<ArchiveEntry>> {
    let format = ArchiveFormat::detect(bytes).ok_or(ArchiveError::UnknownFormat)?;
    let tar_bytes = decompress(format, bytes)?;

    let mut archive = Archive::new(tar_bytes.as_ref());
    let mut root: Option<String> = None;
    let mut entries = Vec::new();

    for entry in archive.entries().map_err(ArchiveError::Corrupt)? {
        let mut entry = entry.map_err(ArchiveError::Corrupt)?;
        let entry_type = entry.header().entry_type();
        if entry_type == EntryType::XGlobalHeader {
            continue;
        }

        let raw_path = entry.path().map_err(ArchiveError::Corrupt)?.into_owned();
        let is_dir = match entry_type {
            EntryType::Regular | EntryType::Continuous => false,
            EntryType::Directory => true,
            _ => return Err(ArchiveError::UnsupportedEntry { path: raw_path }),
        };

        let Some((top, rel)) = split_root(&raw_path)? else {
            continue;
        };

        match &root {
            Some(existing) if *existing != top => {
                return Err(ArchiveError::MultipleRoots {
                    first: existing.clone(),
                    second: top,
                });
            }
            Some(_) => {}
            None => root = Some(top),
        }

        if rel.as_os_str().is_empty() {
            if is_dir {
                continue;
            }
            return Err(ArchiveError::MissingRootDirectory { path: raw_path });
        }

        if is_dir {
            entries.push(ArchiveEntry::directory(rel));
        } else {
            // The header size is untrusted; let the buffer grow with the data.
            let declared = entry.size();
            let mut contents = Vec::new();
            entry
                .read_to_end(&mut contents)
                .map_err(ArchiveError::Corrupt)?;
            if contents.len() as u64 != declared {
                return Err(ArchiveError::Corrupt(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "{}: expected {} bytes, found {}",
                        raw_path.display(),
                        declared,
                        contents.len()
                    ),
                )));
            }
            entries.push(ArchiveEntry::file(rel, contents));
        }
    }

    tracing::debug!(
        format = ?format,
        root = root.as_deref().unwrap_or(""),
        entries = entries.len(),
        "decoded archive"
    );

    Ok(entries)
}

fn decompress(format: ArchiveFormat, bytes: &[u8]) -> ArchiveResult<Cow<'_, [u8]>> {
    let mut out = Vec::new();
    match format {
        ArchiveFormat::Tar => return Ok(Cow::Borrowed(bytes)),
        ArchiveFormat::Xz => XzDecoder::new(bytes).read_to_end(&mut out),
        ArchiveFormat::Gzip => MultiGzDecoder::new(bytes).read_to_end(&mut out),
    }
    .map_err(ArchiveError::Corrupt)?;
    Ok(Cow::Owned(out))
}

/// Split an entry path into its top-level directory and the remainder.
///
/// Returns `None` for paths that name nothing, such as `./`.
fn split_root(path: &Path) -> ArchiveResult<Option<(String, PathBuf)>> {
    let mut top: Option<String> = None;
    let mut rel = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => {
                if top.is_none() {
                    top = Some(part.to_string_lossy().into_owned());
                } else {
                    rel.push(part);
                }
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::UnsafePath {
                    path: path.to_path_buf(),
                });
            }
        }
    }

    Ok(top.map(|top| (top, rel)))
}
