//! Subcommand implementations.
//!
//! Each subcommand owns its clap arguments and a `run` entry point that
//! resolves a [`Location`](osinfo_db::paths::Location) from the shared
//! location flags and hands it to the library.

mod common;
pub mod export;
pub mod import;
pub mod path;
pub mod validate;

pub use export::ExportArgs;
pub use import::ImportArgs;
pub use path::PathArgs;
pub use validate::ValidateArgs;
