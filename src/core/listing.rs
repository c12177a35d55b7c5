//! Single-level directory listing for the file browser.

use std::fs;
use std::path::PathBuf;

use crate::config::Workspace;

use super::{clean_relative, resolve_in_root, root_relative, DirEntry, DirectoryListing, FileEntry, PathGuard};

/// Lists the immediate children of a directory inside the workspace.
pub struct DirectoryLister<'a> {
    workspace: &'a Workspace,
}

impl<'a> DirectoryLister<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Returns the directory and file children of `relative_path`, each
    /// sorted case-insensitively by name.
    ///
    /// Listing failures (escape attempt, not a directory, unreadable
    /// directory) come back as a message on the listing; children that
    /// cannot be classified are skipped so one bad entry never blocks
    /// the whole listing.
    pub fn list(&self, relative_path: &str) -> DirectoryListing {
        let root = self.workspace.root();
        let current = resolve_in_root(root, relative_path);

        if !PathGuard::is_safe(&current, root) {
            return DirectoryListing::failed(format!(
                "Access denied: Path '{relative_path}' is outside the base directory."
            ));
        }
        if !current.is_dir() {
            return DirectoryListing::failed(format!(
                "Error: Path '{relative_path}' is not a valid directory."
            ));
        }

        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) => {
                return DirectoryListing::failed(format!(
                    "Error listing directory '{relative_path}': {e}"
                ));
            }
        };

        let mut children: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some((entry.file_name().to_string_lossy().into_owned(), entry.path())),
                Err(e) => {
                    tracing::warn!(
                        "Could not read an entry in '{}': {}. Skipping.",
                        clean_relative(relative_path),
                        e
                    );
                    None
                }
            })
            .collect();
        children.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()));

        let mut directories = Vec::new();
        let mut files = Vec::new();
        for (name, path) in children {
            let rel_path = root_relative(&path, root);
            // Follows symlinks, like the browser the listing feeds.
            match fs::metadata(&path) {
                Ok(md) if md.is_dir() => directories.push(DirEntry { name, rel_path }),
                Ok(md) if md.is_file() => files.push(FileEntry { name, rel_path }),
                Ok(_) => {} // sockets, fifos and friends are not browsable
                Err(e) => {
                    tracing::warn!(
                        "Could not access item '{}' in '{}': {}. Skipping.",
                        name,
                        clean_relative(relative_path),
                        e
                    );
                }
            }
        }

        DirectoryListing {
            directories,
            files,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn workspace(tmp: &TempDir) -> Workspace {
        Workspace::new(tmp.path()).unwrap()
    }

    #[test]
    fn splits_and_sorts_case_insensitively() {
        crate::setup_test_logging();
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("b.txt")).unwrap();
        File::create(tmp.path().join("A.txt")).unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();

        let ws = workspace(&tmp);
        let listing = DirectoryLister::new(&ws).list("");

        assert!(listing.error.is_none());
        let dir_names: Vec<_> = listing.directories.iter().map(|d| d.name.as_str()).collect();
        let file_names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(dir_names, ["sub"]);
        assert_eq!(file_names, ["A.txt", "b.txt"]);
    }

    #[test]
    fn rel_paths_are_root_relative_with_forward_slashes() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut f = File::create(tmp.path().join("sub").join("deep.txt")).unwrap();
        f.write_all(b"x").unwrap();

        let ws = workspace(&tmp);
        let listing = DirectoryLister::new(&ws).list("sub/");
        assert!(listing.error.is_none());
        assert_eq!(listing.files[0].rel_path, "sub/deep.txt");
    }

    #[test]
    fn escape_attempt_is_denied() {
        let tmp = TempDir::new().unwrap();
        let ws = workspace(&tmp);
        let listing = DirectoryLister::new(&ws).list("../../etc");
        let error = listing.error.expect("expected a listing error");
        assert!(error.starts_with("Access denied:"), "got: {error}");
        assert!(listing.directories.is_empty());
        assert!(listing.files.is_empty());
    }

    #[test]
    fn missing_directory_reports_invalid() {
        let tmp = TempDir::new().unwrap();
        let ws = workspace(&tmp);
        let listing = DirectoryLister::new(&ws).list("nope");
        let error = listing.error.expect("expected a listing error");
        assert_eq!(error, "Error: Path 'nope' is not a valid directory.");
    }

    #[test]
    fn file_target_reports_invalid() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("plain.txt")).unwrap();
        let ws = workspace(&tmp);
        let listing = DirectoryLister::new(&ws).list("plain.txt");
        assert!(listing.error.is_some());
    }

    #[test]
    fn listing_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("one.txt")).unwrap();
        std::fs::create_dir(tmp.path().join("d")).unwrap();

        let ws = workspace(&tmp);
        let lister = DirectoryLister::new(&ws);
        assert_eq!(lister.list(""), lister.list(""));
    }
}
