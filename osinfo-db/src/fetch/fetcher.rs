//! Turning an import source into archive bytes.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::config::FetchConfig;

use super::error::{FetchError, FetchResult};
use super::http::{HttpClient, ReqwestClient};
use super::manifest::{Channel, ReleaseManifest};
use super::source::ImportSource;

/// Fetches archives from files, standard input, URLs and release channels.
///
/// Nothing is written to disk; every method returns the bytes in memory.
pub struct NetworkFetcher<C: HttpClient> {
    client: C,
    config: FetchConfig,
}

impl NetworkFetcher<ReqwestClient> {
    /// Create a fetcher backed by a real HTTP client.
    pub fn from_config(config: FetchConfig) -> FetchResult<Self> {
        let client = ReqwestClient::new(&config.user_agent)?;
        Ok(Self::new(client, config))
    }
}

impl<C: HttpClient> NetworkFetcher<C> {
    /// Create a fetcher with the given HTTP client.
    pub fn new(client: C, config: FetchConfig) -> Self {
        Self { client, config }
    }

    /// The fetch configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch and parse the manifest of a release channel.
    pub fn fetch_manifest(&self, channel: Channel) -> FetchResult<ReleaseManifest> {
        let url = self.config.channel_url(channel);
        tracing::debug!(%channel, url, "fetching release manifest");
        let body = self.client.get(url, self.config.manifest_timeout)?;
        ReleaseManifest::parse(&body, url)
    }

    /// Download an archive by URL.
    pub fn fetch_archive(&self, url: &str) -> FetchResult<Vec<u8>> {
        tracing::debug!(url, "downloading archive");
        let bytes = self.client.get(url, self.config.archive_timeout)?;
        tracing::debug!(url, bytes = bytes.len(), "archive downloaded");
        Ok(bytes)
    }

    /// Read an archive from a local file.
    pub fn read_file(&self, path: &Path) -> FetchResult<Vec<u8>> {
        fs::read(path).map_err(|e| FetchError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Fetch archive bytes, reading standard input of the process when the
    /// source asks for it.
    pub fn fetch(&self, source: &ImportSource) -> FetchResult<Vec<u8>> {
        self.fetch_from(source, io::stdin().lock())
    }

    /// Fetch archive bytes, using `stdin` for [`ImportSource::Stdin`].
    pub fn fetch_from<R: Read>(&self, source: &ImportSource, mut stdin: R) -> FetchResult<Vec<u8>> {
        match source {
            ImportSource::Stdin => {
                let mut bytes = Vec::new();
                stdin.read_to_end(&mut bytes).map_err(FetchError::Stdin)?;
                Ok(bytes)
            }
            ImportSource::File(path) => self.read_file(path),
            ImportSource::Url(url) => self.fetch_archive(url),
            ImportSource::Channel(channel) => {
                let manifest = self.fetch_manifest(*channel)?;
                self.fetch_archive(manifest.archive_url())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::http::tests::MockHttpClient;
    use std::time::Duration;
    use tempfile::TempDir;

    const ARCHIVE_URL: &str = "https://r.test/osinfo-db-20240101.tar.xz";

    fn manifest_json() -> String {
        format!(
            r#"{{"release": {{"archive": "{}", "version": "20240101"}}}}"#,
            ARCHIVE_URL
        )
    }

    fn config() -> FetchConfig {
        FetchConfig::new()
            .with_manifest_timeout(Duration::from_secs(3))
            .with_archive_timeout(Duration::from_secs(9))
    }

    #[test]
    fn test_channel_two_step_fetch() {
        let client = MockHttpClient::new()
            .with_response(crate::config::LATEST_MANIFEST_URL, manifest_json())
            .with_response(ARCHIVE_URL, b"archive".to_vec());
        let fetcher = NetworkFetcher::new(client, config());

        let bytes = fetcher
            .fetch_from(&ImportSource::Channel(Channel::Latest), io::empty())
            .unwrap();
        assert_eq!(bytes, b"archive");

        let client = fetcher.client();
        assert_eq!(
            client.requested(),
            vec![crate::config::LATEST_MANIFEST_URL, ARCHIVE_URL]
        );
        assert_eq!(
            client.timeout_for(crate::config::LATEST_MANIFEST_URL),
            Some(Duration::from_secs(3))
        );
        assert_eq!(client.timeout_for(ARCHIVE_URL), Some(Duration::from_secs(9)));
    }

    #[test]
    fn test_nightly_uses_nightly_manifest() {
        let client = MockHttpClient::new()
            .with_response(crate::config::NIGHTLY_MANIFEST_URL, manifest_json())
            .with_response(ARCHIVE_URL, b"nightly".to_vec());
        let fetcher = NetworkFetcher::new(client, config());

        let bytes = fetcher
            .fetch_from(&ImportSource::Channel(Channel::Nightly), io::empty())
            .unwrap();
        assert_eq!(bytes, b"nightly");
    }

    #[test]
    fn test_malformed_manifest() {
        let client =
            MockHttpClient::new().with_response(crate::config::LATEST_MANIFEST_URL, "nope");
        let fetcher = NetworkFetcher::new(client, config());

        let err = fetcher.fetch_manifest(Channel::Latest).unwrap_err();
        assert!(matches!(err, FetchError::ManifestInvalid { .. }));
        assert_eq!(fetcher.client().requested().len(), 1);
    }

    #[test]
    fn test_url_status_error() {
        let client = MockHttpClient::new().with_status(ARCHIVE_URL, 404);
        let fetcher = NetworkFetcher::new(client, config());

        let err = fetcher
            .fetch_from(&ImportSource::Url(ARCHIVE_URL.to_string()), io::empty())
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[test]
    fn test_unreachable_manifest() {
        let fetcher = NetworkFetcher::new(MockHttpClient::new(), config());
        assert!(matches!(
            fetcher.fetch_manifest(Channel::Nightly).unwrap_err(),
            FetchError::Request { .. }
        ));
    }

    #[test]
    fn test_stdin_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.tar.xz");
        fs::write(&path, b"bytes").unwrap();
        let fetcher = NetworkFetcher::new(MockHttpClient::new(), config());

        let from_file = fetcher
            .fetch_from(&ImportSource::File(path), io::empty())
            .unwrap();
        let from_stdin = fetcher
            .fetch_from(&ImportSource::Stdin, &b"bytes"[..])
            .unwrap();
        assert_eq!(from_file, from_stdin);
        assert!(fetcher.client().requested().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let fetcher = NetworkFetcher::new(MockHttpClient::new(), config());
        let err = fetcher
            .fetch_from(&ImportSource::File(dir.path().join("missing")), io::empty())
            .unwrap_err();
        assert!(matches!(err, FetchError::ReadFailed { .. }));
    }
}
