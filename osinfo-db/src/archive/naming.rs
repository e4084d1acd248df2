//! Archive naming conventions.
//!
//! This module is the single source of truth for the names that appear in and
//! around an archive:
//! - Archive filenames (e.g., `osinfo-db-20240101.tar.xz`)
//! - The top-level directory inside the archive (e.g., `osinfo-db-20240101`)
//! - Generated date versions (e.g., `20240101`)

use chrono::{DateTime, Utc};

/// Name of the version marker at the database root.
pub const VERSION_FILE: &str = "VERSION";

/// Name of the license file at the database root.
pub const LICENSE_FILE: &str = "LICENSE";

/// Prefix shared by archive filenames and their root directory.
pub const ARCHIVE_PREFIX: &str = "osinfo-db";

/// Extension of archives produced by the exporter.
pub const ARCHIVE_EXTENSION: &str = "tar.xz";

/// Name of the directory every archive entry lives under.
///
/// # Examples
///
/// ```
/// use osinfo_db::archive::root_dir_name;
///
/// assert_eq!(root_dir_name("20240101"), "osinfo-db-20240101");
/// ```
pub fn root_dir_name(version: &str) -> String {
    format!("{}-{}", ARCHIVE_PREFIX, version)
}

/// Default filename for an archive of the given version.
///
/// # Examples
///
/// ```
/// use osinfo_db::archive::archive_filename;
///
/// assert_eq!(archive_filename("20240101"), "osinfo-db-20240101.tar.xz");
/// assert_eq!(archive_filename("1.2.3"), "osinfo-db-1.2.3.tar.xz");
/// ```
pub fn archive_filename(version: &str) -> String {
    format!("{}.{}", root_dir_name(version), ARCHIVE_EXTENSION)
}

/// Version string for a database exported at `time`.
///
/// Always `YYYYMMDD` in UTC.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use osinfo_db::archive::date_version;
///
/// let time = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 0).unwrap();
/// assert_eq!(date_version(time), "20240307");
/// ```
pub fn date_version(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d").to_string()
}

/// Version string for a database exported now.
pub fn generated_version() -> String {
    date_version(Utc::now())
}
