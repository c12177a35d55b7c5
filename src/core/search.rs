//! Content search across the files of a subtree.

use std::fs;

use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use crate::config::Workspace;
use crate::utils::file_detection::looks_binary;

use super::{
    extension_of, resolve_in_root, root_relative, CoreError, ExtensionFilter, FileSearchResult,
    PathGuard, SearchMatch, SearchQuery,
};

/// Matches per file are capped so one log file cannot drown the results.
const MAX_MATCHES_PER_FILE: usize = 10;

enum Pattern {
    Regex(Regex),
    /// Lower-cased up front when the search is case-insensitive.
    Literal(String),
}

/// Searches file contents under a directory for a literal or regex query.
pub struct ContentSearcher<'a> {
    workspace: &'a Workspace,
}

impl<'a> ContentSearcher<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Walks the subtree at `query.current_path` and returns per-file
    /// line matches.
    ///
    /// Best-effort throughout: binary files, filtered extensions and
    /// unreadable files are skipped silently, and the walk stops once
    /// `max_results` files have matched. The only hard failure is a
    /// regex query that does not compile.
    ///
    /// Files are visited in filesystem-walk order; callers must not
    /// rely on a particular cross-directory ordering.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<FileSearchResult>, CoreError> {
        let pattern = if query.use_regex {
            Pattern::Regex(
                RegexBuilder::new(&query.query)
                    .case_insensitive(!query.case_sensitive)
                    .build()?,
            )
        } else if query.case_sensitive {
            Pattern::Literal(query.query.clone())
        } else {
            Pattern::Literal(query.query.to_lowercase())
        };

        let root = self.workspace.root();
        let search_path = resolve_in_root(root, &query.current_path);
        if !PathGuard::is_safe(&search_path, root) || !search_path.is_dir() {
            return Ok(Vec::new());
        }

        let target_extensions = if query.file_extensions.is_empty() {
            None
        } else {
            Some(ExtensionFilter::normalize_extensions(&query.file_extensions))
        };

        let mut results = Vec::new();
        for entry in WalkDir::new(&search_path)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if results.len() >= query.max_results {
                break;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();

            if let Some(extensions) = &target_extensions {
                let ext = extension_of(path);
                if !extensions.iter().any(|e| *e == ext) {
                    continue;
                }
            }
            if looks_binary(path) {
                continue;
            }

            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!("Skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes);

            let matches = match &pattern {
                Pattern::Regex(re) => regex_matches(re, &content),
                Pattern::Literal(needle) => {
                    literal_matches(needle, &content, query.case_sensitive, &query.query)
                }
            };
            if !matches.is_empty() {
                results.push(FileSearchResult {
                    file: root_relative(path, root),
                    matches,
                });
            }
        }

        Ok(results)
    }
}

fn regex_matches(re: &Regex, content: &str) -> Vec<SearchMatch> {
    let mut matches = Vec::new();
    for m in re.find_iter(content) {
        if matches.len() >= MAX_MATCHES_PER_FILE {
            break;
        }
        let line = content[..m.start()].bytes().filter(|&b| b == b'\n').count() + 1;
        let line_start = content[..m.start()].rfind('\n').map_or(0, |i| i + 1);
        let line_end = content[m.end()..]
            .find('\n')
            .map_or(content.len(), |i| i + m.end());
        matches.push(SearchMatch {
            line,
            content: content[line_start..line_end].trim().to_string(),
            matched: m.as_str().to_string(),
        });
    }
    matches
}

fn literal_matches(
    needle: &str,
    content: &str,
    case_sensitive: bool,
    original_query: &str,
) -> Vec<SearchMatch> {
    let mut matches = Vec::new();
    for (index, line) in content.split('\n').enumerate() {
        if matches.len() >= MAX_MATCHES_PER_FILE {
            break;
        }
        let hit = if case_sensitive {
            line.contains(needle)
        } else {
            line.to_lowercase().contains(needle)
        };
        if hit {
            matches.push(SearchMatch {
                line: index + 1,
                content: line.trim().to_string(),
                matched: original_query.to_string(),
            });
        }
    }
    matches
}
