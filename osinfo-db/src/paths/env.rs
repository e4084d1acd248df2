//! Explicit snapshot of the environment consumed by path resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::layer::{Layer, DB_SUBDIR};

/// Environment variables that influence where the database lives.
///
/// Captured once per invocation with [`Environment::from_process`], or built
/// by hand in tests. Empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    system_dir: Option<PathBuf>,
    local_dir: Option<PathBuf>,
    user_dir: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
}

impl Environment {
    /// An environment with nothing set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the relevant variables from the running process.
    ///
    /// `HOME` falls back to the platform's notion of the home directory when
    /// the variable itself is missing.
    pub fn from_process() -> Self {
        let mut env = Self::from_vars(std::env::vars_os());
        if env.home.is_none() {
            env.home = dirs::home_dir();
        }
        env
    }

    /// Build an environment from `(name, value)` pairs.
    ///
    /// Unknown names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        vars.into_iter().fold(Self::default(), |env, (key, value)| {
            let key: OsString = key.into();
            match key.to_str() {
                Some(name) => env.with_var(name, value),
                None => env,
            }
        })
    }

    /// Set a single variable.
    pub fn with_var(mut self, name: &str, value: impl Into<OsString>) -> Self {
        let value: OsString = value.into();
        let value = if value.is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        };

        match name {
            "OSINFO_SYSTEM_DIR" => self.system_dir = value,
            "OSINFO_LOCAL_DIR" => self.local_dir = value,
            "OSINFO_USER_DIR" => self.user_dir = value,
            "XDG_CONFIG_HOME" => self.xdg_config_home = value,
            "HOME" => self.home = value,
            _ => {}
        }
        self
    }

    /// The override directory for a layer, if its variable is set.
    pub fn layer_override(&self, layer: Layer) -> Option<&Path> {
        match layer {
            Layer::System => self.system_dir.as_deref(),
            Layer::Local => self.local_dir.as_deref(),
            Layer::User => self.user_dir.as_deref(),
        }
    }

    /// The user's configuration directory.
    ///
    /// `$XDG_CONFIG_HOME` when set, otherwise `$HOME/.config`. With neither
    /// available this degrades to a relative `.config`.
    pub fn user_config_dir(&self) -> PathBuf {
        match (&self.xdg_config_home, &self.home) {
            (Some(xdg), _) => xdg.clone(),
            (None, Some(home)) => home.join(".config"),
            (None, None) => PathBuf::from(".config"),
        }
    }

    /// Default user database directory, before any root prefix.
    pub fn user_db_dir(&self) -> PathBuf {
        self.user_config_dir().join(DB_SUBDIR)
    }
}
