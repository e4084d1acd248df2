//! Database layers and their compiled-in defaults.

use std::fmt;

/// Data directory prefix used for the system layer.
///
/// Set `OSINFO_DB_DATADIR` at build time to override.
pub const DATA_DIR: &str = match option_env!("OSINFO_DB_DATADIR") {
    Some(dir) => dir,
    None => "/usr/share",
};

/// Configuration directory prefix used for the local layer.
///
/// Set `OSINFO_DB_SYSCONFDIR` at build time to override.
pub const SYSCONF_DIR: &str = match option_env!("OSINFO_DB_SYSCONFDIR") {
    Some(dir) => dir,
    None => "/etc",
};

/// Name of the database directory below each prefix.
pub const DB_SUBDIR: &str = "osinfo";

/// A named precedence tier of the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Vendor-provided database shipped with the operating system.
    System,
    /// Administrator overrides for all users of the host.
    Local,
    /// Per-user overrides.
    User,
}

impl Layer {
    /// All layers, lowest precedence first.
    pub const ALL: [Layer; 3] = [Layer::System, Layer::Local, Layer::User];

    /// Environment variable that overrides this layer's directory.
    pub fn env_var(&self) -> &'static str {
        match self {
            Layer::System => "OSINFO_SYSTEM_DIR",
            Layer::Local => "OSINFO_LOCAL_DIR",
            Layer::User => "OSINFO_USER_DIR",
        }
    }

    /// Lowercase name, matching the command-line flag.
    pub fn name(&self) -> &'static str {
        match self {
            Layer::System => "system",
            Layer::Local => "local",
            Layer::User => "user",
        }
    }

    /// Layer used when no location was requested.
    ///
    /// Privileged accounts default to the local layer, everyone else to
    /// their user layer.
    pub fn default_for(privileged: bool) -> Self {
        if privileged {
            Layer::Local
        } else {
            Layer::User
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the current process runs with an effective uid of 0.
#[cfg(unix)]
pub fn is_privileged() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Whether the current process runs with an effective uid of 0.
#[cfg(not(unix))]
pub fn is_privileged() -> bool {
    false
}
