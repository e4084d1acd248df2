//! Release channels and their JSON manifests.

use std::fmt;

use serde::Deserialize;

use super::error::{FetchError, FetchResult};

/// A named stream of published database releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// The most recent stable release.
    Latest,
    /// The most recent nightly build.
    Nightly,
}

impl Channel {
    /// Lowercase channel name.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Latest => "latest",
            Channel::Nightly => "nightly",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Manifest published for a release channel.
///
/// ```json
/// {"release": {"archive": "https://.../osinfo-db-20240101.tar.xz", "version": "20240101"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseManifest {
    pub release: Release,
}

/// The release a manifest points at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// URL of the archive.
    pub archive: String,
    /// Version of the archive, when published.
    #[serde(default)]
    pub version: Option<String>,
}

impl ReleaseManifest {
    /// Parse a manifest fetched from `url`.
    pub fn parse(bytes: &[u8], url: &str) -> FetchResult<Self> {
        let manifest: ReleaseManifest =
            serde_json::from_slice(bytes).map_err(|e| FetchError::ManifestInvalid {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if manifest.release.archive.trim().is_empty() {
            return Err(FetchError::ManifestInvalid {
                url: url.to_string(),
                reason: "empty archive URL".to_string(),
            });
        }

        Ok(manifest)
    }

    /// Archive URL.
    pub fn archive_url(&self) -> &str {
        self.release.archive.trim()
    }

    /// Published version, if any.
    pub fn version(&self) -> Option<&str> {
        self.release.version.as_deref()
    }
}
