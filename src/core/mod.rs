//! The path-safety and file-aggregation engine.
//!
//! Every operation in this module resolves caller-supplied relative paths
//! against the configured [`Workspace`](crate::config::Workspace) root and
//! refuses to touch anything outside of it. Failures on individual files
//! are recovered locally and surfaced as messages; only a malformed regex
//! query aborts a call.

pub mod aggregate;
pub mod error;
pub mod listing;
pub mod path_guard;
pub mod search;
pub mod walk;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A directory child, as shown in the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub rel_path: String,
}

/// A file child, as shown in the browser. Same shape as [`DirEntry`] but
/// the two are never mixed in one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub rel_path: String,
}

/// The result of listing one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub directories: Vec<DirEntry>,
    pub files: Vec<FileEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DirectoryListing {
    pub(crate) fn failed(message: String) -> Self {
        Self {
            directories: Vec::new(),
            files: Vec::new(),
            error: Some(message),
        }
    }
}

/// One matching line within a searched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// 1-based line number.
    pub line: usize,
    /// The full enclosing line, trimmed.
    pub content: String,
    /// The matched text (the query itself in literal mode).
    #[serde(rename = "match")]
    pub matched: String,
}

/// All matches found in a single file, capped per file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSearchResult {
    pub file: String,
    pub matches: Vec<SearchMatch>,
}

/// Parameters for one content search, already validated by the boundary.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub current_path: String,
    pub file_extensions: Vec<String>,
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub max_results: usize,
}

/// A concatenation outcome: the output text plus per-file warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub output: String,
    pub errors: Vec<String>,
}

pub use aggregate::ContentAggregator;
pub use error::CoreError;
pub use listing::DirectoryLister;
pub use path_guard::PathGuard;
pub use search::ContentSearcher;
pub use walk::{ExtensionFilter, RecursiveExpander};

/// Strips the leading/trailing slashes callers tend to include.
pub(crate) fn clean_relative(relative_path: &str) -> &str {
    relative_path.trim_matches('/')
}

/// Joins a caller-supplied relative path onto the root. The result still
/// has to pass [`PathGuard::is_safe`] before it is touched.
pub(crate) fn resolve_in_root(root: &Path, relative_path: &str) -> PathBuf {
    root.join(clean_relative(relative_path))
}

/// Renders `path` relative to `root` with forward slashes, regardless of
/// the host separator.
pub(crate) fn root_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lower-cased extension with leading dot, or an empty string for files
/// without one (`Makefile`, `.gitignore`).
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}
