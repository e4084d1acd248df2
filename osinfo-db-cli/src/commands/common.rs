//! Location flags shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use osinfo_db::paths::{DirectorySelector, Layer, Location};

/// Selects which database directory a command operates on.
#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// Use the system database directory
    #[arg(long, conflicts_with_all = ["local", "user", "dir"])]
    pub system: bool,

    /// Use the local (host-wide override) database directory
    #[arg(long, conflicts_with_all = ["system", "user", "dir"])]
    pub local: bool,

    /// Use the per-user database directory
    #[arg(long, conflicts_with_all = ["system", "local", "dir"])]
    pub user: bool,

    /// Use an explicit database directory
    #[arg(long, value_name = "PATH", conflicts_with_all = ["system", "local", "user"])]
    pub dir: Option<PathBuf>,

    /// Resolve default directories below an alternate filesystem root
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,
}

impl LocationArgs {
    /// The selector these flags ask for.
    pub fn selector(&self) -> DirectorySelector {
        if let Some(dir) = &self.dir {
            DirectorySelector::Explicit(dir.clone())
        } else if self.system {
            DirectorySelector::Layer(Layer::System)
        } else if self.local {
            DirectorySelector::Layer(Layer::Local)
        } else if self.user {
            DirectorySelector::Layer(Layer::User)
        } else {
            DirectorySelector::Default
        }
    }

    /// Convert to a library location.
    pub fn to_location(&self) -> Location {
        Location {
            selector: self.selector(),
            root: self.root.clone(),
        }
    }
}
