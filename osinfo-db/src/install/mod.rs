//! Importing archives into database directories.
//!
//! An import never leaves the target half written: the archive is decoded
//! completely in memory, staged in a sibling directory together with the
//! target's existing files, and swapped into place by rename.
//!
//! Imports overlay the target. Files the archive does not mention are kept;
//! files it does mention are replaced.
//!
//! Two imports into the same target at the same time are not serialised.

mod error;
mod installer;
mod staging;

pub use error::{InstallError, InstallResult};
pub use installer::{
    installed_version, is_newer, ImportOutcome, InstallOptions, InstallReport, InstallStage,
    Installer,
};
pub use staging::{StagedCounts, StagingArea};
