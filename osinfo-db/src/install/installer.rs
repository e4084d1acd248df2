//! Archive import into a database directory.
//!
//! This module orchestrates the full import workflow:
//! 1. Check the target
//! 2. Fetch the archive (through the channel manifest if needed)
//! 3. Decode it completely in memory
//! 4. Stage the new tree next to the target
//! 5. Swap the staged tree into place

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::archive::{self, ArchiveEntry, VERSION_FILE};
use crate::fetch::{Channel, FetchError, HttpClient, ImportSource, NetworkFetcher};

use super::error::{InstallError, InstallResult};
use super::staging::StagingArea;

/// Import stages, used for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// Fetching the release manifest.
    FetchingManifest,
    /// Reading or downloading the archive.
    Fetching,
    /// Decoding the archive.
    Decoding,
    /// Writing entries into the staging area.
    Staging,
    /// Carrying over existing files.
    Merging,
    /// Swapping the staged tree into place.
    Swapping,
    /// Import complete.
    Complete,
}

impl InstallStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchingManifest => "Fetching manifest",
            Self::Fetching => "Fetching",
            Self::Decoding => "Decoding",
            Self::Staging => "Staging",
            Self::Merging => "Merging",
            Self::Swapping => "Swapping",
            Self::Complete => "Complete",
        }
    }
}

/// Options controlling an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    /// Skip `latest` channel imports whose release is not newer than the
    /// installed VERSION.
    pub check_version: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            check_version: true,
        }
    }
}

impl InstallOptions {
    /// Enable or disable the version check for the `latest` channel.
    pub fn with_check_version(mut self, check: bool) -> Self {
        self.check_version = check;
        self
    }
}

/// Result of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Directory the archive was installed into.
    pub target: PathBuf,
    /// Version recorded in the archive, if it carried one.
    pub version: Option<String>,
    /// Files written from the archive.
    pub files: usize,
    /// Directories written from the archive.
    pub directories: usize,
    /// Existing files kept from the previous tree.
    pub preserved: usize,
}

/// Result of an import request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The archive was installed.
    Installed(InstallReport),
    /// The installed database is already at or past the published release.
    UpToDate {
        target: PathBuf,
        installed: String,
        available: String,
    },
}

/// Imports archives into database directories.
pub struct Installer<C: HttpClient> {
    fetcher: NetworkFetcher<C>,
    options: InstallOptions,
}

impl<C: HttpClient> Installer<C> {
    /// Create a new installer.
    pub fn new(fetcher: NetworkFetcher<C>) -> Self {
        Self {
            fetcher,
            options: InstallOptions::default(),
        }
    }

    /// Set the import options.
    pub fn with_options(mut self, options: InstallOptions) -> Self {
        self.options = options;
        self
    }

    /// The fetcher used for network and file sources.
    pub fn fetcher(&self) -> &NetworkFetcher<C> {
        &self.fetcher
    }

    /// Import from `source` into `target`, reading the process's standard
    /// input for [`ImportSource::Stdin`].
    pub fn import(&self, source: &ImportSource, target: &Path) -> InstallResult<ImportOutcome> {
        self.import_from(source, target, io::stdin().lock())
    }

    /// Import from `source` into `target`, using `stdin` for
    /// [`ImportSource::Stdin`].
    pub fn import_from<R: Read>(
        &self,
        source: &ImportSource,
        target: &Path,
        stdin: R,
    ) -> InstallResult<ImportOutcome> {
        check_target(target)?;
        tracing::debug!(%source, target = %target.display(), "starting import");

        let bytes = match source {
            ImportSource::Channel(channel) => {
                log_stage(InstallStage::FetchingManifest);
                let manifest = self.fetcher.fetch_manifest(*channel)?;

                if *channel == Channel::Latest && self.options.check_version {
                    let available =
                        manifest.version().ok_or_else(|| FetchError::ManifestInvalid {
                            url: self.fetcher.config().channel_url(*channel).to_string(),
                            reason: "missing release version".to_string(),
                        })?;
                    if let Some(installed) = installed_version(target) {
                        if !is_newer(available, &installed) {
                            tracing::info!(
                                installed = %installed,
                                available,
                                "database is up to date"
                            );
                            return Ok(ImportOutcome::UpToDate {
                                target: target.to_path_buf(),
                                installed,
                                available: available.to_string(),
                            });
                        }
                    }
                }

                log_stage(InstallStage::Fetching);
                self.fetcher.fetch_archive(manifest.archive_url())?
            }
            other => {
                log_stage(InstallStage::Fetching);
                self.fetcher.fetch_from(other, stdin)?
            }
        };

        self.install_bytes(&bytes, target)
            .map(ImportOutcome::Installed)
    }

    /// Decode archive bytes and install them into `target`.
    pub fn install_bytes(&self, bytes: &[u8], target: &Path) -> InstallResult<InstallReport> {
        check_target(target)?;

        log_stage(InstallStage::Decoding);
        let entries = archive::decode(bytes)?;

        self.install_entries(&entries, target)
    }

    /// Install already decoded entries into `target`.
    pub fn install_entries(
        &self,
        entries: &[ArchiveEntry],
        target: &Path,
    ) -> InstallResult<InstallReport> {
        check_target(target)?;

        log_stage(InstallStage::Staging);
        let mut staging = StagingArea::create(target)?;
        staging.write_entries(entries)?;

        log_stage(InstallStage::Merging);
        staging.merge_existing()?;
        let counts = staging.counts();

        log_stage(InstallStage::Swapping);
        let installed = staging.commit()?;

        log_stage(InstallStage::Complete);
        let report = InstallReport {
            target: installed,
            version: archive::entries_version(entries),
            files: counts.files,
            directories: counts.directories,
            preserved: counts.preserved,
        };
        tracing::info!(
            target = %report.target.display(),
            version = report.version.as_deref().unwrap_or("unknown"),
            files = report.files,
            "import complete"
        );
        Ok(report)
    }
}

fn log_stage(stage: InstallStage) {
    tracing::debug!(stage = stage.name(), "import stage");
}

/// Fail if `target` exists as anything but a directory.
fn check_target(target: &Path) -> InstallResult<()> {
    match fs::metadata(target) {
        Ok(meta) if !meta.is_dir() => Err(InstallError::TargetNotDirectory {
            path: target.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// VERSION of the database currently installed in `target`.
pub fn installed_version(target: &Path) -> Option<String> {
    fs::read_to_string(target.join(VERSION_FILE))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether `available` is a newer release than `installed`.
///
/// Published versions are `YYYYMMDD` dates, so plain string ordering applies.
pub fn is_newer(available: &str, installed: &str) -> bool {
    available.trim() > installed.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{encode, EncodeOptions};
    use crate::config::{FetchConfig, LATEST_MANIFEST_URL, NIGHTLY_MANIFEST_URL};
    use crate::error::ErrorKind;
    use crate::fetch::http::tests::MockHttpClient;
    use tempfile::TempDir;

    const ARCHIVE_URL: &str = "https://r.test/osinfo-db-20240101.tar.xz";

    fn sample_archive(version: &str) -> Vec<u8> {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("os/debian.org")).unwrap();
        fs::write(dir.path().join("os/debian.org/debian-12.xml"), "<libosinfo/>").unwrap();
        encode(dir.path(), &EncodeOptions::new().with_version(version))
            .unwrap()
            .bytes
    }

    fn manifest(version: &str) -> String {
        format!(
            r#"{{"release": {{"archive": "{}", "version": "{}"}}}}"#,
            ARCHIVE_URL, version
        )
    }

    fn installer(client: MockHttpClient) -> Installer<MockHttpClient> {
        Installer::new(NetworkFetcher::new(client, FetchConfig::default()))
    }

    #[test]
    fn test_install_stage_name() {
        assert_eq!(InstallStage::FetchingManifest.name(), "Fetching manifest");
        assert_eq!(InstallStage::Swapping.name(), "Swapping");
        assert_eq!(InstallStage::Complete.name(), "Complete");
    }

    #[test]
    fn test_import_from_stdin() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("osinfo");

        let outcome = installer(MockHttpClient::new())
            .import_from(&ImportSource::Stdin, &target, sample_archive("42").as_slice())
            .unwrap();

        let ImportOutcome::Installed(report) = outcome else {
            panic!("expected install");
        };
        assert_eq!(report.version.as_deref(), Some("42"));
        assert_eq!(report.files, 2);
        assert_eq!(fs::read_to_string(target.join("VERSION")).unwrap(), "42");
        assert!(target.join("os/debian.org/debian-12.xml").is_file());
    }

    #[test]
    fn test_target_not_directory() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("file");
        fs::write(&target, "x").unwrap();

        let client = MockHttpClient::new().with_response(ARCHIVE_URL, sample_archive("1"));
        let installer = installer(client);
        let err = installer
            .import_from(&ImportSource::Url(ARCHIVE_URL.to_string()), &target, io::empty())
            .unwrap_err();

        assert!(matches!(err, InstallError::TargetNotDirectory { .. }));
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(installer.fetcher().client().requested().is_empty());
    }

    #[test]
    fn test_corrupt_archive_leaves_target() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("osinfo");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("VERSION"), "0").unwrap();

        let mut bytes = sample_archive("1");
        bytes.truncate(bytes.len() / 2);
        let err = installer(MockHttpClient::new())
            .import_from(&ImportSource::Stdin, &target, bytes.as_slice())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert_eq!(fs::read_to_string(target.join("VERSION")).unwrap(), "0");
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_latest_up_to_date_skips_download() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("osinfo");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("VERSION"), "20240101\n").unwrap();

        let client = MockHttpClient::new()
            .with_response(LATEST_MANIFEST_URL, manifest("20240101"))
            .with_response(ARCHIVE_URL, sample_archive("20240101"));
        let installer = installer(client);

        let outcome = installer
            .import_from(&ImportSource::Channel(Channel::Latest), &target, io::empty())
            .unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::UpToDate {
                target: target.clone(),
                installed: "20240101".to_string(),
                available: "20240101".to_string(),
            }
        );
        assert_eq!(
            installer.fetcher().client().requested(),
            vec![LATEST_MANIFEST_URL]
        );
    }

    #[test]
    fn test_latest_newer_installs() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("osinfo");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("VERSION"), "20230101").unwrap();

        let client = MockHttpClient::new()
            .with_response(LATEST_MANIFEST_URL, manifest("20240101"))
            .with_response(ARCHIVE_URL, sample_archive("20240101"));

        let outcome = installer(client)
            .import_from(&ImportSource::Channel(Channel::Latest), &target, io::empty())
            .unwrap();
        assert!(matches!(outcome, ImportOutcome::Installed(_)));
        assert_eq!(fs::read_to_string(target.join("VERSION")).unwrap(), "20240101");
    }

    #[test]
    fn test_latest_without_version_is_rejected() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("osinfo");

        let client = MockHttpClient::new()
            .with_response(
                LATEST_MANIFEST_URL,
                format!(r#"{{"release": {{"archive": "{}"}}}}"#, ARCHIVE_URL),
            )
            .with_response(ARCHIVE_URL, sample_archive("20240101"));
        let installer = installer(client);

        let err = installer
            .import_from(&ImportSource::Channel(Channel::Latest), &target, io::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            InstallError::Fetch(FetchError::ManifestInvalid { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert!(!target.exists());
        assert_eq!(
            installer.fetcher().client().requested(),
            vec![LATEST_MANIFEST_URL]
        );
    }

    #[test]
    fn test_nightly_always_installs() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("osinfo");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("VERSION"), "20991231").unwrap();

        let client = MockHttpClient::new()
            .with_response(NIGHTLY_MANIFEST_URL, manifest("20240101"))
            .with_response(ARCHIVE_URL, sample_archive("20240101"));

        let outcome = installer(client)
            .import_from(&ImportSource::Channel(Channel::Nightly), &target, io::empty())
            .unwrap();
        assert!(matches!(outcome, ImportOutcome::Installed(_)));
    }

    #[test]
    fn test_version_check_can_be_disabled() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("osinfo");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("VERSION"), "20240101").unwrap();

        let client = MockHttpClient::new()
            .with_response(LATEST_MANIFEST_URL, manifest("20240101"))
            .with_response(ARCHIVE_URL, sample_archive("20240101"));

        let outcome = installer(client)
            .with_options(InstallOptions::default().with_check_version(false))
            .import_from(&ImportSource::Channel(Channel::Latest), &target, io::empty())
            .unwrap();
        assert!(matches!(outcome, ImportOutcome::Installed(_)));
    }

    #[test]
    fn test_manifest_failure_is_transfer_error() {
        let root = TempDir::new().unwrap();
        let client = MockHttpClient::new().with_status(LATEST_MANIFEST_URL, 503);

        let err = installer(client)
            .import_from(
                &ImportSource::Channel(Channel::Latest),
                &root.path().join("osinfo"),
                io::empty(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert!(!root.path().join("osinfo").exists());
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("20240102", "20240101"));
        assert!(!is_newer("20240101", "20240101"));
        assert!(!is_newer("20230101", "20240101"));
    }
}
