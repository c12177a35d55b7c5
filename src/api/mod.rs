//! The request boundary: typed parameter structs per operation and the
//! service that dispatches them to the core.
//!
//! A hosting server deserializes a request body into one of the structs
//! here, calls the matching [`ContextService`] method, and serializes
//! whatever comes back. All validation beyond basic typing lives in the
//! core; this layer only shapes inputs and outputs and performs the
//! directory-expansion/deduplication step the aggregator leaves to its
//! callers.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::Workspace;
use crate::core::{
    ContentAggregator, ContentSearcher, CoreError, DirEntry, DirectoryLister, FileEntry,
    FileSearchResult, RecursiveExpander, SearchQuery,
};
use crate::core::{clean_relative, ExtensionFilter};

fn default_max_results() -> usize {
    50
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDirectoryRequest {
    #[serde(default)]
    pub relative_path: String,
}

/// What the browse view renders: the listing plus navigation context.
#[derive(Debug, Clone, Serialize)]
pub struct BrowseView {
    pub current_relative_path: String,
    /// Parent of the current path; `None` at the root, the empty string
    /// for first-level children (their parent is the root itself).
    pub parent_path: Option<String>,
    pub directories: Vec<DirEntry>,
    pub files: Vec<FileEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesByExtensionRequest {
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub current_path: String,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilesByExtensionResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub current_path: String,
    #[serde(default)]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub use_regex: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<FileSearchResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub selected_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponse {
    pub preview_content: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub selected_files: Vec<String>,
    #[serde(default)]
    pub selected_directories: Vec<String>,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub final_output: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableExtensionsRequest {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtensionsResponse {
    pub extensions: Vec<String>,
}

/// Dispatches boundary requests to the core components. Owns the
/// [`Workspace`]; one instance serves the whole process.
pub struct ContextService {
    workspace: Workspace,
}

impl ContextService {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Lists a directory for the browser, with the parent link the view
    /// needs for "up" navigation.
    pub fn browse(&self, request: &ListDirectoryRequest) -> BrowseView {
        let relative_path = clean_relative(&request.relative_path).to_string();
        let listing = DirectoryLister::new(&self.workspace).list(&relative_path);

        let parent_path = if relative_path.is_empty() {
            None
        } else {
            Some(match relative_path.rsplit_once('/') {
                Some((parent, _)) => parent.to_string(),
                None => String::new(),
            })
        };

        BrowseView {
            current_relative_path: relative_path,
            parent_path,
            directories: listing.directories,
            files: listing.files,
            error: listing.error,
        }
    }

    pub fn files_by_extension(&self, request: &FilesByExtensionRequest) -> FilesByExtensionResponse {
        let files = ExtensionFilter::new(&self.workspace).files_by_extension(
            &request.extensions,
            &request.current_path,
            request.recursive,
        );
        FilesByExtensionResponse { files }
    }

    /// Runs a content search. Rejects empty queries up front; a regex
    /// that does not compile surfaces as [`CoreError::InvalidRegex`].
    pub fn search_content(&self, request: &SearchRequest) -> Result<SearchResponse, CoreError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(CoreError::EmptyQuery);
        }

        let results = ContentSearcher::new(&self.workspace).search(&SearchQuery {
            query: query.to_string(),
            current_path: request.current_path.clone(),
            file_extensions: request.file_extensions.clone(),
            case_sensitive: request.case_sensitive,
            use_regex: request.use_regex,
            max_results: request.max_results,
        })?;
        Ok(SearchResponse { results })
    }

    pub fn preview_content(&self, request: &PreviewRequest) -> PreviewResponse {
        let result = ContentAggregator::new(&self.workspace).preview(&request.selected_files);
        PreviewResponse {
            preview_content: result.output,
            errors: result.errors,
        }
    }

    /// Produces the final output: expands each selected directory into
    /// its files, merges them after the explicitly selected ones, drops
    /// duplicates preserving first-seen order, and hands the flat list
    /// to the aggregator together with the trimmed prompt.
    pub fn process(&self, request: &ProcessRequest) -> ProcessResponse {
        let expander = RecursiveExpander::new(&self.workspace);
        let mut all_files = request.selected_files.clone();
        for directory in &request.selected_directories {
            all_files.extend(expander.all_files_under(directory));
        }

        let mut seen = HashSet::new();
        let unique_files: Vec<String> = all_files
            .into_iter()
            .filter(|file| seen.insert(file.clone()))
            .collect();

        let result =
            ContentAggregator::new(&self.workspace).finalize(&unique_files, request.prompt.trim());
        ProcessResponse {
            final_output: result.output,
            errors: result.errors,
        }
    }

    /// Collects the extensions present in a directory (and, when
    /// `recursive`, everything beneath its subdirectories), sorted
    /// ascending. A listing failure is returned as the error message the
    /// lister produced.
    pub fn available_extensions(
        &self,
        request: &AvailableExtensionsRequest,
    ) -> Result<ExtensionsResponse, CoreError> {
        let listing = DirectoryLister::new(&self.workspace).list(&request.path);
        if let Some(error) = listing.error {
            return Err(CoreError::Listing(error));
        }

        let mut extensions = BTreeSet::new();
        for file in &listing.files {
            if let Some(ext) = listed_extension(&file.name) {
                extensions.insert(ext);
            }
        }
        if request.recursive {
            let expander = RecursiveExpander::new(&self.workspace);
            for dir in &listing.directories {
                for rel_path in expander.all_files_under(&dir.rel_path) {
                    let name = rel_path.rsplit('/').next().unwrap_or(&rel_path);
                    if let Some(ext) = listed_extension(name) {
                        extensions.insert(ext);
                    }
                }
            }
        }

        Ok(ExtensionsResponse {
            extensions: extensions.into_iter().collect(),
        })
    }
}

/// Extension as the extension picker shows it: everything after the last
/// dot, lower-cased, with the dot back in front. Unlike the walk filter
/// this treats dotfiles (`.gitignore`) as having an extension.
fn listed_extension(name: &str) -> Option<String> {
    if !name.contains('.') {
        return None;
    }
    let last = name.rsplit('.').next().unwrap_or_default();
    Some(format!(".{}", last.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_extension_uses_the_last_dot() {
        assert_eq!(listed_extension("notes.TXT"), Some(".txt".to_string()));
        assert_eq!(listed_extension("archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(
            listed_extension(".gitignore"),
            Some(".gitignore".to_string())
        );
        assert_eq!(listed_extension("Makefile"), None);
    }
}
