//! Logging infrastructure for the osinfo-db tools.
//!
//! Log output goes to stderr only. Stdout is reserved for command output
//! such as resolved paths and archive bytes.
//!
//! - Default level is `warn`
//! - `--verbose` raises this crate's and the CLI's level to `debug`
//! - `RUST_LOG` overrides both

use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set and verbose output is off.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used when `RUST_LOG` is not set and verbose output is on.
pub const VERBOSE_FILTER: &str = "warn,osinfo_db=debug,osinfo_db_cli=debug";

/// Filter directives for the requested verbosity.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize logging system.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<(), TryInitError> {
    // Create env filter (RUST_LOG wins over the verbosity flag)
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // Compact single-line output without timestamps
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "warn");
        assert!(default_filter(true).contains("osinfo_db=debug"));
    }

    #[test]
    fn test_filters_parse() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new(VERBOSE_FILTER).is_ok());
    }
}
