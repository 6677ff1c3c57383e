use std::path::{Component, Path, PathBuf};

/// Errors raised while resolving a logical asset path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The resolved file does not exist.
    Missing(PathBuf),
    /// The logical path tried to escape the asset root (absolute or `..`).
    OutsideRoot(String),
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "resource not found: {}", path.display()),
            Self::OutsideRoot(logical) => {
                write!(f, "resource path escapes the asset root: {logical}")
            },
        }
    }
}

impl std::error::Error for ResourceError {}

/// Resolves a logical asset path (e.g. `assets/music/room1.ogg`) to a loadable file.
pub trait ResourceLocator {
    fn resolve(&self, logical: &str) -> Result<PathBuf, ResourceError>;
}

/// Locator rooted at a base directory.
#[derive(Debug, Clone)]
pub struct DirLocator {
    root: PathBuf,
}

impl DirLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join without touching the filesystem.
    pub fn join(&self, logical: &str) -> Result<PathBuf, ResourceError> {
        let relative = Path::new(logical);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ResourceError::OutsideRoot(logical.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceLocator for DirLocator {
    fn resolve(&self, logical: &str) -> Result<PathBuf, ResourceError> {
        let path = self.join(logical)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(ResourceError::Missing(path))
        }
    }
}
