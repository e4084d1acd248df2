//! Walking directories and files through a schema oracle.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive::{LICENSE_FILE, VERSION_FILE};
use crate::paths::{Environment, Location};

use super::oracle::{SchemaOracle, XmlSchemaOracle};
use super::report::ValidationReport;

/// Validates database trees entry by entry.
///
/// Validation never stops early; every problem ends up in the report.
#[derive(Debug)]
pub struct Validator<O: SchemaOracle = XmlSchemaOracle> {
    oracle: O,
}

impl Validator<XmlSchemaOracle> {
    /// A validator using the standard XML checks.
    pub fn xml() -> Self {
        Self::new(XmlSchemaOracle::default())
    }
}

impl Default for Validator<XmlSchemaOracle> {
    fn default() -> Self {
        Self::xml()
    }
}

impl<O: SchemaOracle> Validator<O> {
    /// Create a validator with the given oracle.
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Resolve `location` and validate the directory it names.
    pub fn validate(&self, location: &Location, env: &Environment) -> ValidationReport {
        let resolved = location.resolve(env);
        self.validate_tree(&resolved.path)
    }

    /// Validate a mix of files and directories.
    pub fn validate_paths<P: AsRef<Path>>(&self, paths: &[P]) -> ValidationReport {
        let mut report = ValidationReport::new();
        for path in paths {
            let path = path.as_ref();
            match fs::metadata(path) {
                Ok(meta) if meta.is_dir() => report.merge(self.validate_tree(path)),
                Ok(meta) if meta.is_file() => self.check_file(path, &mut report),
                Ok(_) => report.fail(path, "unsupported file type"),
                Err(e) => report.fail(path, e.to_string()),
            }
        }
        report
    }

    /// Validate every file below `dir`.
    ///
    /// The top-level VERSION and LICENSE files are not data and are skipped.
    pub fn validate_tree(&self, dir: &Path) -> ValidationReport {
        let mut report = ValidationReport::new();

        match fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                report.fail(dir, "not a directory");
                return report;
            }
            Err(e) => {
                report.fail(dir, format!("cannot open directory: {}", e));
                return report;
            }
        }

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| dir.to_path_buf());
                    report.fail(path, e.to_string());
                    continue;
                }
            };

            if entry.depth() == 1 && is_metadata_file(entry.path()) {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            } else if file_type.is_file() {
                self.check_file(entry.path(), &mut report);
            } else {
                report.fail(entry.path(), "unsupported file type");
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            checked = report.entries().len(),
            failed = report.failure_count(),
            "validated directory"
        );
        report
    }

    fn check_file(&self, path: &Path, report: &mut ValidationReport) {
        tracing::debug!("validating {}", path.display());
        match fs::read(path) {
            Ok(contents) => match self.oracle.check(path, &contents) {
                Ok(()) => report.pass(path),
                Err(message) => report.fail(path, message),
            },
            Err(e) => report.fail(path, format!("cannot read: {}", e)),
        }
    }
}

fn is_metadata_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name == VERSION_FILE || name == LICENSE_FILE)
        .unwrap_or(false)
}

/// Paths of every failed entry, for callers that only need the list.
pub fn failed_paths(report: &ValidationReport) -> Vec<PathBuf> {
    report.failures().map(|e| e.path.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::Layer;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, contents) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        dir
    }

    #[test]
    fn test_all_valid() {
        let dir = tree(&[
            ("VERSION", "not xml"),
            ("LICENSE", "GPL"),
            ("os/a.xml", "<libosinfo/>"),
            ("schema/osinfo.rng", "<grammar/>"),
        ]);
        let report = Validator::xml().validate_tree(dir.path());
        assert!(report.is_success());
        assert_eq!(report.entries().len(), 2);
    }

    #[test]
    fn test_collects_every_failure() {
        let dir = tree(&[
            ("os/a.xml", "<libosinfo>"),
            ("os/b.xml", "<libosinfo/>"),
            ("os/c.xml", "<nope/>"),
        ]);
        let report = Validator::xml().validate_tree(dir.path());
        assert_eq!(report.failure_count(), 2);
        assert_eq!(
            failed_paths(&report),
            vec![dir.path().join("os/a.xml"), dir.path().join("os/c.xml")]
        );
    }

    #[test]
    fn test_nested_version_is_checked() {
        let dir = tree(&[("os/VERSION.xml", "<bad"), ("os/VERSION", "x")]);
        let report = Validator::xml().validate_tree(dir.path());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.entries().len(), 2);
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let report = Validator::xml().validate_tree(&dir.path().join("missing"));
        assert!(!report.is_success());
    }

    #[test]
    fn test_validate_location() {
        let dir = tree(&[("os/a.xml", "<libosinfo/>")]);
        let env =
            Environment::empty().with_var("OSINFO_USER_DIR", dir.path().as_os_str().to_owned());
        let report = Validator::xml().validate(&Location::layer(Layer::User), &env);
        assert!(report.is_success());
        assert_eq!(report.entries().len(), 1);
    }

    #[test]
    fn test_validate_paths_mixed() {
        let dir = tree(&[("good.xml", "<libosinfo/>"), ("sub/bad.xml", "<x/>")]);
        let report = Validator::xml().validate_paths(&[
            dir.path().join("good.xml"),
            dir.path().join("sub"),
            dir.path().join("absent.xml"),
        ]);
        assert_eq!(report.entries().len(), 3);
        assert_eq!(report.failure_count(), 2);
        assert!(report.get(&dir.path().join("good.xml")).unwrap().is_pass());
    }

    struct RejectAll;

    impl SchemaOracle for RejectAll {
        fn check(&self, _path: &Path, _contents: &[u8]) -> Result<(), String> {
            Err("rejected".to_string())
        }
    }

    #[test]
    fn test_custom_oracle() {
        let dir = tree(&[("README", "x")]);
        let report = Validator::new(RejectAll).validate_tree(dir.path());
        assert_eq!(report.failure_count(), 1);
    }
}
