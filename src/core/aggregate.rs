//! Deterministic concatenation of selected files into one output blob.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::Workspace;

use super::{resolve_in_root, AggregationResult, PathGuard};

/// Concatenates selected file contents (plus an optional prompt) into a
/// single string, accumulating per-file errors instead of aborting.
pub struct ContentAggregator<'a> {
    workspace: &'a Workspace,
}

impl<'a> ContentAggregator<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Builds the preview text for the given files, in the given order.
    ///
    /// Unsafe or missing files are skipped with a warning; read failures
    /// after the check are recorded and the remaining files still go in.
    pub fn preview(&self, selected_files: &[String]) -> AggregationResult {
        let root = self.workspace.root();
        let mut parts: Vec<String> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        for rel_path in selected_files {
            let abs = resolve_in_root(root, rel_path);
            if !PathGuard::is_safe(&abs, root) || !abs.is_file() {
                errors.push(format!("Skipped invalid/unsafe file for preview: {rel_path}"));
                continue;
            }

            parts.push(format!("--- Preview from: {rel_path} ---\n"));
            match read_lossy(&abs) {
                Ok(content) => {
                    parts.push(content);
                    parts.push("\n--- End Preview ---\n".to_string());
                }
                Err(e) => {
                    errors.push(format!("Error reading file '{rel_path}' for preview: {e}"));
                }
            }
        }

        AggregationResult {
            output: parts.join("\n").trim().to_string(),
            errors,
        }
    }

    /// Builds the final output: an optional prompt block followed by the
    /// content of each selected file, in the given order.
    ///
    /// Callers that expand directory selections must deduplicate by path
    /// (first-seen order) before calling this, so a file is never
    /// emitted twice.
    pub fn finalize(&self, selected_files: &[String], prompt: &str) -> AggregationResult {
        if selected_files.is_empty() && prompt.is_empty() {
            return AggregationResult {
                output: String::new(),
                errors: vec!["No files selected and no prompt provided.".to_string()],
            };
        }

        let root = self.workspace.root();
        let mut parts: Vec<String> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        if !prompt.is_empty() {
            parts.push("--- User Prompt ---".to_string());
            parts.push(prompt.to_string());
            parts.push("--- End User Prompt ---".to_string());
            parts.push("\n".to_string());
        }

        for rel_path in selected_files {
            let abs = resolve_in_root(root, rel_path);
            if !PathGuard::is_safe(&abs, root) || !abs.is_file() {
                let message = format!("Security Denied or Invalid File: '{rel_path}'");
                tracing::warn!("{}", message);
                errors.push(message);
                continue;
            }

            parts.push(format!("--- Content from: {rel_path} ---"));
            match read_lossy(&abs) {
                Ok(content) => {
                    parts.push(content);
                    parts.push("--- End Content ---".to_string());
                    parts.push("\n".to_string());
                }
                Err(e) => {
                    let message = format!("Error reading file '{rel_path}': {e}");
                    tracing::warn!("{}", message);
                    errors.push(message);
                }
            }
        }

        AggregationResult {
            output: parts.join("\n").trim().to_string(),
            errors,
        }
    }
}

/// Whole-file read tolerating undecodable bytes. I/O errors stay errors;
/// invalid UTF-8 is replaced, never fatal.
fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(tmp: &TempDir, name: &str, body: &str) {
        let mut f = File::create(tmp.path().join(name)).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn preview_wraps_each_file_in_delimiters() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp, "a.txt", "alpha");
        let ws = Workspace::new(tmp.path()).unwrap();

        let result = ContentAggregator::new(&ws).preview(&["a.txt".to_string()]);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.output,
            "--- Preview from: a.txt ---\n\nalpha\n\n--- End Preview ---"
        );
    }

    #[test]
    fn preview_skips_unsafe_and_missing_files() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp, "a.txt", "alpha");
        let ws = Workspace::new(tmp.path()).unwrap();

        let result = ContentAggregator::new(&ws).preview(&[
            "../../etc/passwd".to_string(),
            "missing.txt".to_string(),
            "a.txt".to_string(),
        ]);
        assert_eq!(
            result.errors,
            [
                "Skipped invalid/unsafe file for preview: ../../etc/passwd",
                "Skipped invalid/unsafe file for preview: missing.txt",
            ]
        );
        assert!(result.output.contains("alpha"));
    }

    #[test]
    fn finalize_with_nothing_to_do_is_a_usability_error() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path()).unwrap();

        let result = ContentAggregator::new(&ws).finalize(&[], "");
        assert_eq!(result.output, "");
        assert_eq!(result.errors, ["No files selected and no prompt provided."]);
    }

    #[test]
    fn finalize_prepends_the_prompt_block() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp, "a.txt", "alpha");
        let ws = Workspace::new(tmp.path()).unwrap();

        let result = ContentAggregator::new(&ws).finalize(&["a.txt".to_string()], "hi");
        let expected = "--- User Prompt ---\nhi\n--- End User Prompt ---\n\n\n\
                        --- Content from: a.txt ---\nalpha\n--- End Content ---";
        assert_eq!(result.output, expected);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn finalize_prompt_only_is_a_success() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path()).unwrap();

        let result = ContentAggregator::new(&ws).finalize(&[], "just the prompt");
        assert!(result.errors.is_empty());
        assert!(result.output.starts_with("--- User Prompt ---"));
        assert!(result.output.contains("just the prompt"));
    }

    #[test]
    fn finalize_records_one_error_per_bad_file_and_keeps_going() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp, "a.txt", "alpha");
        let ws = Workspace::new(tmp.path()).unwrap();

        let result = ContentAggregator::new(&ws)
            .finalize(&["a.txt".to_string(), "missing.txt".to_string()], "hi");
        assert_eq!(
            result.errors,
            ["Security Denied or Invalid File: 'missing.txt'"]
        );
        assert!(result.output.contains("--- User Prompt ---"));
        assert_eq!(result.output.matches("--- Content from: a.txt ---").count(), 1);
    }

    #[test]
    fn finalize_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp, "a.txt", "alpha");
        write_file(&tmp, "b.txt", "beta");
        let ws = Workspace::new(tmp.path()).unwrap();

        let selection = ["a.txt".to_string(), "b.txt".to_string()];
        let aggregator = ContentAggregator::new(&ws);
        let first = aggregator.finalize(&selection, "p");
        let second = aggregator.finalize(&selection, "p");
        assert_eq!(first, second);
    }

    #[test]
    fn undecodable_bytes_do_not_fail_the_read() {
        let tmp = TempDir::new().unwrap();
        let mut f = File::create(tmp.path().join("latin1.txt")).unwrap();
        f.write_all(&[b'c', b'a', b'f', 0xe9]).unwrap(); // "café" in Latin-1
        let ws = Workspace::new(tmp.path()).unwrap();

        let result = ContentAggregator::new(&ws).preview(&["latin1.txt".to_string()]);
        assert!(result.errors.is_empty());
        assert!(result.output.contains("caf"));
    }
}
