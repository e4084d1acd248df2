//! osinfo-db CLI - Command-line interface
//!
//! Locate, export, import and validate osinfo database directories.

mod commands;
mod error;

use std::process;

use clap::{Parser, Subcommand};
use osinfo_db::logging;
use osinfo_db::paths::Environment;

use commands::{ExportArgs, ImportArgs, PathArgs, ValidateArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "osinfo-db")]
#[command(version, about = "Manage osinfo database directories", long_about = None)]
struct Cli {
    /// Log every entry processed
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the path of a database directory
    Path(PathArgs),
    /// Export a database directory as a .tar.xz archive
    Export(ExportArgs),
    /// Import an archive into a database directory
    Import(ImportArgs),
    /// Validate the entries of a database directory
    Validate(ValidateArgs),
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1; --help and --version exit 0
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    if let Err(e) = logging::init_logging(cli.verbose) {
        CliError::LoggingInit(e.to_string()).exit();
    }

    let env = Environment::from_process();
    let result = match cli.command {
        Commands::Path(args) => commands::path::run(args, &env),
        Commands::Export(args) => commands::export::run(args, &env),
        Commands::Import(args) => commands::import::run(args, &env),
        Commands::Validate(args) => commands::validate::run(args, &env),
    };

    if let Err(e) = result {
        e.exit();
    }
}
