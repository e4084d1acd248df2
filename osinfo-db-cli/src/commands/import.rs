//! `osinfo-db import`: install an archive into a database directory.

use std::time::Duration;

use clap::Args;
use osinfo_db::config::FetchConfig;
use osinfo_db::fetch::{Channel, ImportSource, NetworkFetcher};
use osinfo_db::install::{ImportOutcome, Installer};
use osinfo_db::paths::Environment;

use super::common::LocationArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Import the latest release, unless the installed one is current
    #[arg(long, conflicts_with_all = ["nightly", "source"])]
    pub latest: bool,

    /// Import the latest nightly build
    #[arg(long, conflicts_with = "source")]
    pub nightly: bool,

    /// Seconds to wait for a release manifest
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub manifest_timeout: u64,

    /// Seconds to wait for the archive download
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub archive_timeout: u64,

    /// Archive file, http(s) URL, or - for standard input (default: standard input)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,
}

impl ImportArgs {
    fn import_source(&self) -> ImportSource {
        if self.latest {
            ImportSource::Channel(Channel::Latest)
        } else if self.nightly {
            ImportSource::Channel(Channel::Nightly)
        } else {
            ImportSource::from_arg(self.source.as_deref())
        }
    }

    fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new()
            .with_manifest_timeout(Duration::from_secs(self.manifest_timeout))
            .with_archive_timeout(Duration::from_secs(self.archive_timeout))
    }
}

pub fn run(args: ImportArgs, env: &Environment) -> Result<(), CliError> {
    let target = args.location.to_location().resolve(env);
    let source = args.import_source();

    let fetcher = NetworkFetcher::from_config(args.fetch_config())?;
    let outcome = Installer::new(fetcher).import(&source, &target.path)?;

    match outcome {
        ImportOutcome::Installed(report) => tracing::debug!(
            files = report.files,
            preserved = report.preserved,
            "imported {} into {}",
            source,
            report.target.display()
        ),
        ImportOutcome::UpToDate {
            target,
            installed,
            available,
        } => tracing::info!(
            "{} already has version {} (latest is {}), nothing to do",
            target.display(),
            installed,
            available
        ),
    }
    Ok(())
}
