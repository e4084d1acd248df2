//! `osinfo-db path`: print a resolved database directory.

use std::io::{self, Write};

use clap::Args;
use osinfo_db::paths::Environment;

use super::common::LocationArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct PathArgs {
    #[command(flatten)]
    pub location: LocationArgs,
}

pub fn run(args: PathArgs, env: &Environment) -> Result<(), CliError> {
    let resolved = args.location.to_location().resolve(env);

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(resolved.path.as_os_str().as_encoded_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
        .map_err(CliError::Output)
}
