//! Configuration for fetching archives.

use std::time::Duration;

use crate::fetch::Channel;

/// Manifest describing the latest stable database release.
pub const LATEST_MANIFEST_URL: &str = "https://db.libosinfo.org/latest.json";

/// Manifest describing the latest nightly database build.
pub const NIGHTLY_MANIFEST_URL: &str = "https://db.libosinfo.org/nightly.json";

/// Default timeout for fetching a release manifest.
pub const DEFAULT_MANIFEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for downloading an archive.
pub const DEFAULT_ARCHIVE_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for network fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Manifest URL of the `latest` channel.
    pub latest_url: String,

    /// Manifest URL of the `nightly` channel.
    pub nightly_url: String,

    /// Timeout for the manifest request of a channel import.
    pub manifest_timeout: Duration,

    /// Timeout for downloading the archive itself.
    pub archive_timeout: Duration,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            latest_url: LATEST_MANIFEST_URL.to_string(),
            nightly_url: NIGHTLY_MANIFEST_URL.to_string(),
            manifest_timeout: DEFAULT_MANIFEST_TIMEOUT,
            archive_timeout: DEFAULT_ARCHIVE_TIMEOUT,
            user_agent: format!("osinfo-db/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest URL for a release channel.
    pub fn channel_url(&self, channel: Channel) -> &str {
        match channel {
            Channel::Latest => &self.latest_url,
            Channel::Nightly => &self.nightly_url,
        }
    }

    /// Set the manifest URL of the `latest` channel.
    pub fn with_latest_url(mut self, url: impl Into<String>) -> Self {
        self.latest_url = url.into();
        self
    }

    /// Set the manifest URL of the `nightly` channel.
    pub fn with_nightly_url(mut self, url: impl Into<String>) -> Self {
        self.nightly_url = url.into();
        self
    }

    /// Set the manifest timeout.
    pub fn with_manifest_timeout(mut self, timeout: Duration) -> Self {
        self.manifest_timeout = timeout;
        self
    }

    /// Set the archive download timeout.
    pub fn with_archive_timeout(mut self, timeout: Duration) -> Self {
        self.archive_timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
