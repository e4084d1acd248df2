//! `osinfo-db export`: package a database directory as an archive.

use std::path::PathBuf;

use clap::Args;
use osinfo_db::archive::EncodeOptions;
use osinfo_db::export::{ArchiveDestination, Exporter};
use osinfo_db::paths::Environment;

use super::common::LocationArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// File to include as the archive's LICENSE
    #[arg(long, value_name = "PATH")]
    pub license: Option<PathBuf>,

    /// Version to record in the archive (default: existing VERSION or today's date)
    #[arg(long = "version", value_name = "VERSION")]
    pub archive_version: Option<String>,

    /// Output file, or - for stdout (default: osinfo-db-<--version or today's date>.tar.xz)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<String>,
}

impl ExportArgs {
    fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            version: self.archive_version.clone(),
            license: self.license.clone(),
            mtime: None,
        }
    }
}

pub fn run(args: ExportArgs, env: &Environment) -> Result<(), CliError> {
    let location = args.location.to_location();
    let destination = ArchiveDestination::from_arg(args.output.as_deref());

    let report = Exporter::new(args.encode_options()).export(&location, env, &destination)?;

    tracing::debug!(
        entries = report.entries,
        bytes = report.bytes,
        version = %report.version,
        "exported {}",
        report.source.display()
    );
    Ok(())
}
