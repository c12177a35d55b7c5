//! Process-wide configuration: the base directory every operation is confined to.

use anyhow::{ensure, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::core::path_guard::lexical_absolute;

/// The workspace root, fixed for the lifetime of the process.
///
/// All relative paths arriving at the core are resolved against this
/// directory, and no filesystem access is permitted outside of it. The
/// path is absolutized and lexically normalized at construction time;
/// symbolic links are intentionally not resolved, so the stored root is
/// exactly the directory the user named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Creates a workspace rooted at `dir`, resolved against the current
    /// working directory if relative.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let cwd = env::current_dir().context("could not determine current working directory")?;
        let root = lexical_absolute(dir.as_ref(), &cwd);
        ensure!(
            root.is_dir(),
            "base directory '{}' is not an existing directory",
            root.display()
        );
        tracing::debug!("Workspace rooted at {}", root.display());
        Ok(Self { root })
    }

    /// Creates a workspace rooted at the current working directory.
    pub fn from_current_dir() -> Result<Self> {
        let cwd = env::current_dir().context("could not determine current working directory")?;
        Self::new(cwd)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
