//! Subtree traversal: extension-filtered file collection and directory
//! expansion for the selection workflow.

use std::fs;

use walkdir::WalkDir;

use crate::config::Workspace;

use super::{extension_of, resolve_in_root, root_relative, PathGuard};

/// Collects files whose extension matches a requested set.
pub struct ExtensionFilter<'a> {
    workspace: &'a Workspace,
}

impl<'a> ExtensionFilter<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Lower-cases each requested extension and prefixes the leading dot
    /// when missing. Shared with the search path so both filter the
    /// same way.
    pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
        extensions
            .iter()
            .map(|ext| {
                if !ext.is_empty() && !ext.starts_with('.') {
                    format!(".{}", ext.to_lowercase())
                } else {
                    ext.to_lowercase()
                }
            })
            .collect()
    }

    /// Returns the root-relative paths of every file under
    /// `relative_path` whose extension is in `extensions`, sorted
    /// ascending. An empty extension set matches every file.
    ///
    /// An unsafe or non-directory path yields an empty list; the empty
    /// result is the failure indicator here.
    pub fn files_by_extension(
        &self,
        extensions: &[String],
        relative_path: &str,
        recursive: bool,
    ) -> Vec<String> {
        let root = self.workspace.root();
        let search_path = resolve_in_root(root, relative_path);
        if !PathGuard::is_safe(&search_path, root) || !search_path.is_dir() {
            return Vec::new();
        }

        let normalized = Self::normalize_extensions(extensions);
        let wanted =
            |ext: &str| normalized.is_empty() || normalized.iter().any(|n| n.as_str() == ext);

        let mut files = Vec::new();
        if recursive {
            for entry in WalkDir::new(&search_path)
                .follow_links(false)
                .into_iter()
                .filter_map(Result::ok)
            {
                if entry.file_type().is_file() && wanted(&extension_of(entry.path())) {
                    files.push(root_relative(entry.path(), root));
                }
            }
        } else {
            let entries = match fs::read_dir(&search_path) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Error getting files by extension: {}", e);
                    return files;
                }
            };
            for entry in entries.filter_map(Result::ok) {
                let path = entry.path();
                if path.is_file() && wanted(&extension_of(&path)) {
                    files.push(root_relative(&path, root));
                }
            }
        }

        files.sort();
        files
    }
}

/// Expands a directory selection into the flat list of files beneath it.
pub struct RecursiveExpander<'a> {
    workspace: &'a Workspace,
}

impl<'a> RecursiveExpander<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Every file reachable from `relative_dir`, in walk order (not
    /// sorted). Silently empty if the path is unsafe or not a directory.
    pub fn all_files_under(&self, relative_dir: &str) -> Vec<String> {
        let root = self.workspace.root();
        let dir = resolve_in_root(root, relative_dir);
        if !PathGuard::is_safe(&dir, root) || !dir.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&dir)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| root_relative(entry.path(), root))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Workspace) {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("notes.txt")).unwrap();
        File::create(tmp.path().join("image.png")).unwrap();
        File::create(tmp.path().join("Makefile")).unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        File::create(tmp.path().join("sub").join("deep.txt")).unwrap();
        File::create(tmp.path().join("sub").join("code.rs")).unwrap();
        let ws = Workspace::new(tmp.path()).unwrap();
        (tmp, ws)
    }

    #[test]
    fn non_recursive_matches_only_direct_children() {
        let (_tmp, ws) = fixture();
        let files =
            ExtensionFilter::new(&ws).files_by_extension(&["txt".to_string()], "", false);
        assert_eq!(files, ["notes.txt"]);
    }

    #[test]
    fn recursive_walks_the_subtree() {
        let (_tmp, ws) = fixture();
        let files = ExtensionFilter::new(&ws).files_by_extension(&["txt".to_string()], "", true);
        assert_eq!(files, ["notes.txt", "sub/deep.txt"]);
    }

    #[test]
    fn extension_matching_is_case_insensitive_and_dot_tolerant() {
        let (_tmp, ws) = fixture();
        let filter = ExtensionFilter::new(&ws);
        assert_eq!(
            filter.files_by_extension(&["TXT".to_string()], "", true),
            ["notes.txt", "sub/deep.txt"]
        );
        assert_eq!(
            filter.files_by_extension(&[".TxT".to_string()], "", true),
            ["notes.txt", "sub/deep.txt"]
        );
    }

    #[test]
    fn empty_extension_set_matches_everything() {
        let (_tmp, ws) = fixture();
        let files = ExtensionFilter::new(&ws).files_by_extension(&[], "", true);
        assert_eq!(
            files,
            ["Makefile", "image.png", "notes.txt", "sub/code.rs", "sub/deep.txt"]
        );
    }

    #[test]
    fn unsafe_or_missing_path_yields_empty_list() {
        let (_tmp, ws) = fixture();
        let filter = ExtensionFilter::new(&ws);
        assert!(filter.files_by_extension(&[], "../..", true).is_empty());
        assert!(filter.files_by_extension(&[], "notes.txt", true).is_empty());
        assert!(filter.files_by_extension(&[], "missing", false).is_empty());
    }

    #[test]
    fn expander_returns_each_file_exactly_once() {
        let (_tmp, ws) = fixture();
        let mut files = RecursiveExpander::new(&ws).all_files_under("sub");
        files.sort();
        assert_eq!(files, ["sub/code.rs", "sub/deep.txt"]);
    }

    #[test]
    fn expander_is_silent_on_bad_paths() {
        let (_tmp, ws) = fixture();
        let expander = RecursiveExpander::new(&ws);
        assert!(expander.all_files_under("../../etc").is_empty());
        assert!(expander.all_files_under("notes.txt").is_empty());
    }
}
