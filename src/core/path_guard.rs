//! Path containment: the predicate that gates every filesystem read.

use std::path::{Component, Path, PathBuf};

/// Decides whether a candidate path lies inside the workspace root.
///
/// This struct is stateless and provides methods as associated functions.
pub struct PathGuard;

impl PathGuard {
    /// Returns `true` iff `candidate`, absolutized and lexically
    /// normalized, is the root itself or lies strictly beneath it.
    ///
    /// Containment is component-wise, so `/root2` is not inside `/root`.
    /// Symbolic links are not resolved: a link inside the root that
    /// points outside of it will pass this check. Known limitation,
    /// kept to match the lexical `abspath` semantics of the original
    /// containment rule.
    pub fn is_safe(candidate: &Path, root: &Path) -> bool {
        lexical_absolute(candidate, root).starts_with(root)
    }
}

/// Absolutizes `path` against `base` and removes `.`/`..` segments
/// without touching the filesystem.
pub fn lexical_absolute(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            // Popping at the root is a no-op, so "/.." stays "/".
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
