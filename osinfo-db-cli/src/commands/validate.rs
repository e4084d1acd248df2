//! `osinfo-db validate`: check every entry of a database directory.

use std::path::PathBuf;

use clap::Args;
use osinfo_db::paths::Environment;
use osinfo_db::validate::{ValidationReport, Validator};

use super::common::LocationArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Files or directories to validate instead of a database location
    #[arg(value_name = "PATH", conflicts_with_all = ["system", "local", "user", "dir", "root"])]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs, env: &Environment) -> Result<(), CliError> {
    let validator = Validator::xml();
    let report = if args.paths.is_empty() {
        validator.validate(&args.location.to_location(), env)
    } else {
        validator.validate_paths(&args.paths)
    };

    finish(&report)
}

/// Print failures to stderr and turn them into an error.
fn finish(report: &ValidationReport) -> Result<(), CliError> {
    for failure in report.failures() {
        eprintln!("{}", failure);
    }

    if report.is_success() {
        tracing::debug!(checked = report.entries().len(), "validation passed");
        Ok(())
    } else {
        Err(CliError::Validation {
            failed: report.failure_count(),
            checked: report.entries().len(),
        })
    }
}
