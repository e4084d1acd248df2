//! Accumulated validation results.

use std::fmt;
use std::path::{Path, PathBuf};

/// Verdict for a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
}

/// Result of checking one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryResult {
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl EntryResult {
    pub fn is_pass(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// Diagnostic of a failed entry.
    pub fn diagnostic(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Pass => None,
            Outcome::Fail(message) => Some(message),
        }
    }
}

impl fmt::Display for EntryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Pass => write!(f, "{}: ok", self.path.display()),
            Outcome::Fail(message) => write!(f, "{}: {}", self.path.display(), message),
        }
    }
}

/// Every result of a validation run, in the order entries were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    entries: Vec<EntryResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pass(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(EntryResult {
            path: path.into(),
            outcome: Outcome::Pass,
        });
    }

    pub fn fail(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        let path = path.into();
        let message = message.into();
        tracing::debug!(path = %path.display(), %message, "validation failed");
        self.entries.push(EntryResult {
            path,
            outcome: Outcome::Fail(message),
        });
    }

    /// Append another report's results.
    pub fn merge(&mut self, other: ValidationReport) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[EntryResult] {
        &self.entries
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryResult> {
        self.entries.iter().filter(|e| !e.is_pass())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// True when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Result recorded for `path`, if it was visited.
    pub fn get(&self, path: &Path) -> Option<&EntryResult> {
        self.entries.iter().find(|e| e.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_tracks_failures() {
        let mut report = ValidationReport::new();
        assert!(report.is_success());

        report.pass("a.xml");
        report.fail("b.xml", "not well-formed");
        assert!(!report.is_success());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(
            report.get(Path::new("b.xml")).unwrap().to_string(),
            "b.xml: not well-formed"
        );
    }
}
