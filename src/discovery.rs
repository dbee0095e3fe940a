//! Discovery of export files on disk.

use crate::error::{AnalyzerError, Result};
use crate::model::ClusterState;
use crate::parser::{ParseStats, ResourceParser};
use glob::Pattern;
use log::{info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File name patterns used when none are supplied for a directory scan.
pub const DEFAULT_PATTERNS: &[&str] = &["*.yaml", "*.yml", "*.json", "kubectl-*", "*-export"];

/// Options controlling file discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// File name glob patterns. `None` means [`DEFAULT_PATTERNS`] for
    /// directories and "accept" for a single-file root.
    pub patterns: Option<Vec<String>>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Keep only the first `max_files` paths after sorting.
    pub max_files: Option<usize>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            patterns: None,
            recursive: true,
            max_files: None,
        }
    }
}

impl DiscoveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file name pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.get_or_insert_with(Vec::new).push(pattern.into());
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_max_files(mut self, max_files: Option<usize>) -> Self {
        self.max_files = max_files;
        self
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| AnalyzerError::InvalidPattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn matches_any(path: &Path, patterns: &[Pattern]) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    patterns.iter().any(|p| p.matches(file_name))
}

/// Find export files under `root`.
///
/// Returns a deduplicated, lexicographically sorted list, truncated to
/// `max_files` when set. A missing root is an error.
pub fn find_kubernetes_files(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(AnalyzerError::PathNotFound(root.to_path_buf()));
    }

    if root.is_file() {
        let accepted = match &options.patterns {
            Some(patterns) => matches_any(root, &compile_patterns(patterns)?),
            None => true,
        };
        return Ok(if accepted {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let patterns = match &options.patterns {
        Some(patterns) => compile_patterns(patterns)?,
        None => {
            let defaults: Vec<String> = DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect();
            compile_patterns(&defaults)?
        }
    };

    let mut walker = walkdir::WalkDir::new(root).follow_links(true);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let found: BTreeSet<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches_any(p, &patterns))
        .collect();

    let mut files: Vec<PathBuf> = found.into_iter().collect();
    if let Some(max) = options.max_files {
        if files.len() > max {
            warn!(
                "Found {} files, limiting to the first {}",
                files.len(),
                max
            );
            files.truncate(max);
        }
    }

    info!("Discovered {} files under {}", files.len(), root.display());
    Ok(files)
}

/// Discover export files under `root` and parse them into one state.
pub fn discover_and_parse(
    root: &Path,
    options: &DiscoveryOptions,
    parallel: bool,
) -> Result<(ClusterState, ParseStats)> {
    let files = find_kubernetes_files(root, options)?;
    let mut parser = ResourceParser::new().with_parallel(parallel);
    let state = parser.parse_multiple_files(&files);
    Ok((state, parser.stats()))
}
