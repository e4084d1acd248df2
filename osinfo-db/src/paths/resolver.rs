//! Chain-of-responsibility path resolution.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::env::Environment;
use super::layer::{is_privileged, Layer, DATA_DIR, DB_SUBDIR, SYSCONF_DIR};

/// The location a command was asked to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DirectorySelector {
    /// No location flag given; pick a layer based on privileges.
    #[default]
    Default,
    /// One of the standard layers.
    Layer(Layer),
    /// A directory named on the command line.
    Explicit(PathBuf),
}

/// Where a resolved directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// An explicit directory argument.
    Explicit,
    /// A standard layer.
    Layer(Layer),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Explicit => write!(f, "explicit"),
            Origin::Layer(layer) => write!(f, "{}", layer),
        }
    }
}

/// A concrete directory produced by resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirectory {
    /// The directory path. Not checked for existence.
    pub path: PathBuf,
    /// Layer or explicit argument the path was derived from.
    pub origin: Origin,
    /// Name of the provider that produced the path.
    pub provider: &'static str,
}

/// What a provider is asked to resolve.
#[derive(Debug, Clone, Copy)]
pub enum RequestTarget<'a> {
    /// Explicit directory argument.
    Explicit(&'a Path),
    /// Standard layer.
    Layer(Layer),
}

/// Input handed to every provider in the chain.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub target: RequestTarget<'a>,
    pub root: Option<&'a Path>,
    pub env: &'a Environment,
}

/// One link in the resolution chain.
///
/// Providers are consulted in order; the first to return a directory wins.
pub trait PathProvider {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Resolve the request, or `None` to defer to the next provider.
    fn provide(&self, request: &ResolveRequest<'_>) -> Option<ResolvedDirectory>;
}

/// Returns an explicit directory argument verbatim, ignoring any root.
#[derive(Debug, Default)]
pub struct ExplicitDirProvider;

impl PathProvider for ExplicitDirProvider {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn provide(&self, request: &ResolveRequest<'_>) -> Option<ResolvedDirectory> {
        match request.target {
            RequestTarget::Explicit(dir) => Some(ResolvedDirectory {
                path: dir.to_path_buf(),
                origin: Origin::Explicit,
                provider: self.name(),
            }),
            RequestTarget::Layer(_) => None,
        }
    }
}

/// Uses the layer's `OSINFO_*_DIR` variable when it is set.
///
/// The root prefix is not applied to environment overrides.
#[derive(Debug, Default)]
pub struct EnvOverrideProvider;

impl PathProvider for EnvOverrideProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn provide(&self, request: &ResolveRequest<'_>) -> Option<ResolvedDirectory> {
        let RequestTarget::Layer(layer) = request.target else {
            return None;
        };

        request
            .env
            .layer_override(layer)
            .map(|dir| ResolvedDirectory {
                path: dir.to_path_buf(),
                origin: Origin::Layer(layer),
                provider: self.name(),
            })
    }
}

/// Compiled-in layer defaults, joined under the root prefix when one is given.
#[derive(Debug, Default)]
pub struct DefaultDirProvider;

impl DefaultDirProvider {
    /// Default directory for a layer before any root prefix is applied.
    pub fn default_path(layer: Layer, env: &Environment) -> PathBuf {
        match layer {
            Layer::System => Path::new(DATA_DIR).join(DB_SUBDIR),
            Layer::Local => Path::new(SYSCONF_DIR).join(DB_SUBDIR),
            Layer::User => env.user_db_dir(),
        }
    }

    fn resolved(layer: Layer, root: Option<&Path>, env: &Environment) -> ResolvedDirectory {
        let candidate = Self::default_path(layer, env);
        let path = match root {
            Some(root) => join_under_root(root, &candidate),
            None => candidate,
        };

        ResolvedDirectory {
            path,
            origin: Origin::Layer(layer),
            provider: "default",
        }
    }
}

impl PathProvider for DefaultDirProvider {
    fn name(&self) -> &'static str {
        "default"
    }

    fn provide(&self, request: &ResolveRequest<'_>) -> Option<ResolvedDirectory> {
        match request.target {
            RequestTarget::Layer(layer) => Some(Self::resolved(layer, request.root, request.env)),
            RequestTarget::Explicit(_) => None,
        }
    }
}

/// Append `candidate`'s components under `root`.
///
/// Leading separators (and Windows prefixes) are dropped so an absolute
/// candidate lands inside the root instead of replacing it.
fn join_under_root(root: &Path, candidate: &Path) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in candidate.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => path.push(other),
        }
    }
    path
}

/// Ordered list of providers turning a selector into a directory.
pub struct PathResolver {
    providers: Vec<Box<dyn PathProvider>>,
    privileged: bool,
}

impl fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("PathResolver")
            .field("providers", &names)
            .field("privileged", &self.privileged)
            .finish()
    }
}

impl PathResolver {
    /// Create a resolver with a custom provider chain.
    pub fn new(providers: Vec<Box<dyn PathProvider>>) -> Self {
        Self {
            providers,
            privileged: false,
        }
    }

    /// The standard chain: explicit, then environment, then compiled default.
    ///
    /// The default layer is chosen from the process's effective uid.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ExplicitDirProvider),
            Box::new(EnvOverrideProvider),
            Box::new(DefaultDirProvider),
        ])
        .with_privileged(is_privileged())
    }

    /// Override whether the caller counts as privileged.
    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Names of the providers in consultation order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve a selector. Never fails and never touches the filesystem.
    pub fn resolve(
        &self,
        selector: &DirectorySelector,
        root: Option<&Path>,
        env: &Environment,
    ) -> ResolvedDirectory {
        let target = match selector {
            DirectorySelector::Default => RequestTarget::Layer(Layer::default_for(self.privileged)),
            DirectorySelector::Layer(layer) => RequestTarget::Layer(*layer),
            DirectorySelector::Explicit(dir) => RequestTarget::Explicit(dir),
        };
        let request = ResolveRequest { target, root, env };

        let resolved = self
            .providers
            .iter()
            .find_map(|provider| provider.provide(&request))
            .unwrap_or_else(|| Self::fallback(&request));

        tracing::debug!(
            path = %resolved.path.display(),
            origin = %resolved.origin,
            provider = resolved.provider,
            "resolved database directory"
        );
        resolved
    }

    /// Used when a custom chain has no provider for the request.
    fn fallback(request: &ResolveRequest<'_>) -> ResolvedDirectory {
        match request.target {
            RequestTarget::Explicit(dir) => ResolvedDirectory {
                path: dir.to_path_buf(),
                origin: Origin::Explicit,
                provider: "fallback",
            },
            RequestTarget::Layer(layer) => {
                DefaultDirProvider::resolved(layer, request.root, request.env)
            }
        }
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::standard()
    }
}

/// A requested location: selector plus optional root prefix.
///
/// This is what commands receive from their location flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub selector: DirectorySelector,
    pub root: Option<PathBuf>,
}

impl Location {
    /// Location of one of the standard layers.
    pub fn layer(layer: Layer) -> Self {
        Self {
            selector: DirectorySelector::Layer(layer),
            root: None,
        }
    }

    /// An explicit directory.
    pub fn explicit(dir: impl Into<PathBuf>) -> Self {
        Self {
            selector: DirectorySelector::Explicit(dir.into()),
            root: None,
        }
    }

    /// Set the root prefix.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Resolve with the standard provider chain.
    pub fn resolve(&self, env: &Environment) -> ResolvedDirectory {
        self.resolve_with(&PathResolver::standard(), env)
    }

    /// Resolve with a specific resolver.
    pub fn resolve_with(&self, resolver: &PathResolver, env: &Environment) -> ResolvedDirectory {
        resolver.resolve(&self.selector, self.root.as_deref(), env)
    }
}
