//! Where an import reads its archive from.

use std::fmt;
use std::path::PathBuf;

use super::manifest::Channel;

/// Source of archive bytes for an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Standard input.
    Stdin,
    /// A local archive file.
    File(PathBuf),
    /// A direct archive URL.
    Url(String),
    /// A release channel, resolved through its manifest.
    Channel(Channel),
}

impl ImportSource {
    /// Interpret a command-line source argument.
    ///
    /// `-` or no argument means standard input. Arguments starting with
    /// `http://` or `https://` are URLs; anything else is a local path.
    ///
    /// # Examples
    ///
    /// ```
    /// use osinfo_db::fetch::ImportSource;
    ///
    /// assert_eq!(ImportSource::from_arg(None), ImportSource::Stdin);
    /// assert_eq!(ImportSource::from_arg(Some("-")), ImportSource::Stdin);
    /// assert!(matches!(ImportSource::from_arg(Some("https://x.test/a.tar.xz")), ImportSource::Url(_)));
    /// assert!(matches!(ImportSource::from_arg(Some("db.tar.xz")), ImportSource::File(_)));
    /// ```
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("-") => Self::Stdin,
            Some(url) if is_url(url) => Self::Url(url.to_string()),
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "standard input"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
            Self::Channel(channel) => write!(f, "{} release", channel),
        }
    }
}

fn is_url(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}
