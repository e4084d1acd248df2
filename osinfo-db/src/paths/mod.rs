//! Database directory resolution.
//!
//! Maps a requested location (a [`Layer`] or an explicit directory, optionally
//! under an alternate root) to the directory a command should operate on.
//!
//! Resolution is computed from an explicit [`Environment`] and never checks
//! whether the directory exists. The only process state it consults is the
//! effective uid, which picks the layer when none was requested.
//!
//! # Precedence
//!
//! ```text
//! PathResolver
//!     │
//!     ├── ExplicitDirProvider   --dir PATH, returned verbatim
//!     ├── EnvOverrideProvider   OSINFO_{SYSTEM,LOCAL,USER}_DIR
//!     └── DefaultDirProvider    compiled-in default, joined under --root
//! ```

mod env;
mod layer;
mod resolver;

pub use env::Environment;
pub use layer::{is_privileged, Layer, DATA_DIR, DB_SUBDIR, SYSCONF_DIR};
pub use resolver::{
    DefaultDirProvider, DirectorySelector, EnvOverrideProvider, ExplicitDirProvider, Location,
    Origin, PathProvider, PathResolver, RequestTarget, ResolveRequest, ResolvedDirectory,
};
