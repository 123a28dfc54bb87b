//! Batch Processing Module
//!
//! File discovery for a batch plus the order-independent result accumulator.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lowercase extension of `path`, or an empty string.
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Case-insensitive extension check. `extensions` are given without the dot.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = get_extension_lowercase(path);
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
}

pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Collect regular files directly inside `dir` whose extension is in
/// `extensions`. Subdirectories are not entered.
///
/// Hidden files are ignored. The result is sorted by file name so callers
/// see the same order on every run.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !is_hidden_file(e.path()))
        .filter(|e| has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Aggregated outcome of a batch.
///
/// Failures are kept as `(name, error)` pairs in sorted order, so the
/// result does not depend on the order in which outcomes arrive. Names
/// are not unique: two sources can share a display name once lossily
/// decoded, and each still counts as its own failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self, name: impl Into<String>, error: impl Into<String>) {
        self.total += 1;
        let entry = (name.into(), error.into());
        let at = self.failures.partition_point(|e| *e <= entry);
        self.failures.insert(at, entry);
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    /// Failed source names, sorted. Yields one entry per failure.
    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(name, _)| name.as_str())
    }

    /// Error text of the first failure recorded under `name`.
    pub fn failure_for(&self, name: &str) -> Option<&str> {
        self.failures
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e.as_str())
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}
