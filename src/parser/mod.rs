//! Parsing of kubectl exports (JSON, YAML, multi-document YAML, `List`
//! wrappers) into a [`ClusterState`].
//!
//! Only whole-file failures are returned as errors. Per-document problems
//! are counted in [`ParseStats`] and the document is dropped.

pub mod document;
pub mod format;

pub use document::{DocumentOutcome, ResourceError, parse_document};
pub use format::{Documents, InputFormat};

use crate::error::{AnalyzerError, Result};
use crate::model::ClusterState;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// `cluster_info` key listing the files a state was parsed from.
pub const SOURCE_FILES_KEY: &str = "source_files";

/// Running parse counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    parsed: usize,
    skipped: usize,
    errors: usize,
    total: usize,
}

impl ParseStats {
    pub fn parsed(&self) -> usize {
        self.parsed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    /// `parsed + skipped + errors`.
    pub fn total(&self) -> usize {
        self.total
    }

    fn record_parsed(&mut self) {
        self.parsed += 1;
        self.total += 1;
    }

    fn record_skipped(&mut self) {
        self.skipped += 1;
        self.total += 1;
    }

    fn record_error(&mut self) {
        self.errors += 1;
        self.total += 1;
    }

    /// Add another set of counters to this one.
    pub fn absorb(&mut self, other: ParseStats) {
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.total += other.total;
    }
}

/// Parser for Kubernetes resource exports.
#[derive(Debug, Clone)]
pub struct ResourceParser {
    stats: ParseStats,
    parallel: bool,
}

impl Default for ResourceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceParser {
    /// Create a parser with zeroed counters. Batches are parsed in parallel.
    pub fn new() -> Self {
        Self {
            stats: ParseStats::default(),
            parallel: true,
        }
    }

    /// Enable or disable the rayon worker pool for batch parsing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Counters accumulated by every call on this parser.
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Parse one export file.
    pub fn parse_file(&mut self, path: &Path) -> Result<ClusterState> {
        if !path.exists() {
            return Err(AnalyzerError::PathNotFound(path.to_path_buf()));
        }

        info!("Parsing file: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;

        let mut state = self.parse_str(&content, InputFormat::from_path(path))?;
        state.cluster_info.insert(
            SOURCE_FILES_KEY.to_string(),
            Value::from(vec![path.display().to_string()]),
        );
        Ok(state)
    }

    /// Parse export content that has already been read.
    pub fn parse_str(&mut self, content: &str, format: InputFormat) -> Result<ClusterState> {
        let documents = format::load_documents(content, format).map_err(|e| {
            error!("{}", e);
            e
        })?;

        let mut state = ClusterState::new();
        match documents {
            Documents::Single(document) => self.parse_export(&document, &mut state),
            Documents::Stream(documents) => {
                for document in documents.iter().filter(|d| !d.is_null()) {
                    self.parse_single_resource(document, &mut state);
                }
            }
        }

        state.generate_summary();
        Ok(state)
    }

    /// Parse several files into one state, continuing past files that fail.
    pub fn parse_multiple_files<P>(&mut self, paths: &[P]) -> ClusterState
    where
        P: AsRef<Path> + Sync,
    {
        let results: Vec<(&Path, Result<ClusterState>, ParseStats)> = if self.parallel {
            paths
                .par_iter()
                .map(|p| parse_isolated(p.as_ref()))
                .collect()
        } else {
            paths.iter().map(|p| parse_isolated(p.as_ref())).collect()
        };

        let mut state = ClusterState::new();
        let mut sources = Vec::new();
        for (path, result, stats) in results {
            self.stats.absorb(stats);
            match result {
                Ok(mut file_state) => {
                    file_state.cluster_info.remove(SOURCE_FILES_KEY);
                    state.merge(file_state);
                    sources.push(Value::from(path.display().to_string()));
                }
                Err(e) => {
                    error!("Error parsing file {}: {}", path.display(), e);
                    self.stats.record_error();
                }
            }
        }

        state
            .cluster_info
            .insert(SOURCE_FILES_KEY.to_string(), Value::Array(sources));
        state.generate_summary();
        state
    }

    /// Parse a main file plus additional files to merge into it.
    ///
    /// Without additional files this is [`ResourceParser::parse_file`];
    /// with them, it is a batch where failing files are only counted.
    pub fn parse_export_files(
        &mut self,
        file_path: &Path,
        additional_files: &[PathBuf],
    ) -> Result<ClusterState> {
        let state = if additional_files.is_empty() {
            self.parse_file(file_path)?
        } else {
            let mut all_files = Vec::with_capacity(additional_files.len() + 1);
            all_files.push(file_path.to_path_buf());
            all_files.extend_from_slice(additional_files);
            self.parse_multiple_files(&all_files)
        };

        info!(
            "Parsing complete: parsed={} skipped={} errors={} total={}",
            self.stats.parsed(),
            self.stats.skipped(),
            self.stats.errors(),
            self.stats.total()
        );
        Ok(state)
    }

    /// A single document: either a `List` wrapper or one resource.
    fn parse_export(&mut self, document: &Value, state: &mut ClusterState) {
        let is_list = document.get("kind").and_then(Value::as_str) == Some("List");
        match document.get("items").and_then(Value::as_array) {
            Some(items) if is_list => {
                info!("Found {} items in kubectl export", items.len());
                for item in items {
                    self.parse_single_resource(item, state);
                }
            }
            _ => self.parse_single_resource(document, state),
        }
    }

    fn parse_single_resource(&mut self, document: &Value, state: &mut ClusterState) {
        match parse_document(document) {
            Ok(DocumentOutcome::Parsed(resource)) => {
                debug!("Parsed {}: {}", resource.kind, resource.name());
                self.stats.record_parsed();
                state.add_resource(*resource);
            }
            Ok(DocumentOutcome::MissingKind) => {
                warn!("Resource missing 'kind' field, skipping");
                self.stats.record_skipped();
            }
            Ok(DocumentOutcome::UnsupportedKind(kind)) => {
                debug!("Unsupported resource kind: {}, skipping", kind);
                self.stats.record_skipped();
            }
            Err(e) => {
                error!("Validation error parsing resource: {}", e);
                self.stats.record_error();
            }
        }
    }
}

/// Parse one file with a fresh parser so batch workers share nothing.
fn parse_isolated(path: &Path) -> (&Path, Result<ClusterState>, ParseStats) {
    let mut parser = ResourceParser::new();
    let result = parser.parse_file(path);
    (path, result, parser.stats())
}

/// Parse a main export file, merging any additional files into the same state.
///
/// With additional files, per-file failures are logged and counted rather
/// than returned.
pub fn parse_kubectl_export(
    file_path: &Path,
    additional_files: &[PathBuf],
) -> Result<(ClusterState, ParseStats)> {
    let mut parser = ResourceParser::new();
    let state = parser.parse_export_files(file_path, additional_files)?;
    Ok((state, parser.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HealthStatus, ResourceKind};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parser_initialization() {
        let parser = ResourceParser::new();
        assert_eq!(parser.stats(), ParseStats::default());
        assert_eq!(parser.stats().total(), 0);
    }

    #[test]
    fn test_parse_single_pod_json() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "pod.json",
            &json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": {"name": "test-pod", "namespace": "default", "labels": {"app": "test"}},
                "spec": {"containers": [{"name": "test", "image": "nginx"}]}
            })
            .to_string(),
        );

        let mut parser = ResourceParser::new();
        let state = parser.parse_file(&path).unwrap();

        assert_eq!(state.resources.len(), 1);
        let pod = &state.resources[0];
        assert_eq!(pod.kind, ResourceKind::Pod);
        assert_eq!(pod.name(), "test-pod");
        assert_eq!(pod.namespace(), Some("default"));
        assert_eq!(pod.health_status, HealthStatus::Unknown);
        assert_eq!(parser.stats().parsed(), 1);
        assert_eq!(state.summary.total_resources, 1);
        assert_eq!(state.cluster_info[SOURCE_FILES_KEY].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_list_export_with_unsupported_items() {
        let content = json!({
            "apiVersion": "v1",
            "kind": "List",
            "items": [
                {"kind": "Pod", "metadata": {"name": "pod1", "namespace": "default"}},
                {"kind": "Service", "metadata": {"name": "svc1", "namespace": "default"}},
                {"kind": "Deployment", "metadata": {"name": "d1", "namespace": "default"}},
                {"kind": "CustomResource", "metadata": {"name": "c1"}},
                {"metadata": {"name": "kindless"}}
            ]
        })
        .to_string();

        let mut parser = ResourceParser::new();
        let state = parser.parse_str(&content, InputFormat::Json).unwrap();

        assert_eq!(state.resources.len(), 2);
        assert_eq!(parser.stats().parsed(), 2);
        assert_eq!(parser.stats().skipped(), 3);
        assert_eq!(parser.stats().errors(), 0);
        assert_eq!(parser.stats().total(), 5);
    }

    #[test]
    fn test_multi_document_yaml() {
        let yaml = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: test-config
  namespace: default
data:
  key1: value1
---
---
apiVersion: v1
kind: Service
metadata:
  name: svc
  namespace: default
spec:
  selector:
    app: web
---
apiVersion: v1
kind: Pod
metadata:
  namespace: default
"#;
        let mut parser = ResourceParser::new();
        let state = parser.parse_str(yaml, InputFormat::Yaml).unwrap();

        assert_eq!(state.resources.len(), 2);
        assert_eq!(state.resources[0].kind, ResourceKind::ConfigMap);
        assert_eq!(state.resources[1].kind, ResourceKind::Service);
        assert_eq!(parser.stats().parsed(), 2);
        assert_eq!(parser.stats().errors(), 1);
    }

    #[test]
    fn test_list_inside_stream_is_not_unwrapped() {
        let yaml = "kind: List\nitems:\n- kind: Pod\n  metadata:\n    name: a\n---\nkind: Pod\nmetadata:\n  name: b\n";
        let mut parser = ResourceParser::new();
        let state = parser.parse_str(yaml, InputFormat::Yaml).unwrap();

        assert_eq!(state.resources.len(), 1);
        assert_eq!(state.resources[0].name(), "b");
        assert_eq!(parser.stats().skipped(), 1);
    }

    #[test]
    fn test_yaml_list_wrapper() {
        let yaml = r#"
apiVersion: v1
kind: List
items:
- apiVersion: v1
  kind: Node
  metadata:
    name: worker-1
- apiVersion: v1
  kind: Namespace
  metadata:
    name: prod
"#;
        let mut parser = ResourceParser::new();
        let state = parser.parse_str(yaml, InputFormat::Yaml).unwrap();
        assert_eq!(state.resources.len(), 2);
        assert_eq!(state.summary.namespaces["cluster-scoped"], 2);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let mut parser = ResourceParser::new();
        let err = parser.parse_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, AnalyzerError::PathNotFound(_)));
    }

    #[test]
    fn test_invalid_json_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", "{\"kind\": ");
        let mut parser = ResourceParser::new();
        assert!(matches!(parser.parse_file(&path), Err(AnalyzerError::Json(_))));
    }

    #[test]
    fn test_extensionless_file_detects_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "cluster-export", "kind: Node\nmetadata:\n  name: n1\n");
        let mut parser = ResourceParser::new();
        let state = parser.parse_file(&path).unwrap();
        assert_eq!(state.resources.len(), 1);
    }

    #[test]
    fn test_parse_multiple_files_continues_past_failures() {
        let dir = TempDir::new().unwrap();
        let pod = write(
            &dir,
            "pod.json",
            r#"{"kind": "Pod", "metadata": {"name": "pod1", "namespace": "default"}}"#,
        );
        let broken = write(&dir, "broken.json", "not json at all {");
        let svc = write(
            &dir,
            "service.yaml",
            "kind: Service\nmetadata:\n  name: svc1\n  namespace: default\n",
        );
        let missing = dir.path().join("missing.yaml");

        for parallel in [true, false] {
            let mut parser = ResourceParser::new().with_parallel(parallel);
            let state = parser.parse_multiple_files(&[&pod, &broken, &svc, &missing]);

            let names: Vec<&str> = state.resources.iter().map(|r| r.name()).collect();
            assert_eq!(names, vec!["pod1", "svc1"]);
            assert_eq!(parser.stats().parsed(), 2);
            assert_eq!(parser.stats().errors(), 2);
            assert_eq!(state.summary.total_resources, 2);
            assert_eq!(state.cluster_info[SOURCE_FILES_KEY].as_array().map(Vec::len), Some(2));
        }
    }

    #[test]
    fn test_parse_kubectl_export_function() {
        let dir = TempDir::new().unwrap();
        let main = write(
            &dir,
            "export.json",
            r#"{"kind": "List", "items": [{"kind": "Pod", "metadata": {"name": "a"}}]}"#,
        );
        let extra = write(&dir, "extra.yaml", "kind: Node\nmetadata:\n  name: n1\n");

        let (state, stats) = parse_kubectl_export(&main, &[]).unwrap();
        assert_eq!(state.resources.len(), 1);
        assert_eq!(stats.parsed(), 1);

        let (state, stats) = parse_kubectl_export(&main, &[extra]).unwrap();
        assert_eq!(state.resources.len(), 2);
        assert_eq!(stats.parsed(), 2);
    }

    #[test]
    fn test_stats_absorb() {
        let mut a = ParseStats::default();
        a.record_parsed();
        a.record_skipped();
        let mut b = ParseStats::default();
        b.record_error();
        a.absorb(b);
        assert_eq!((a.parsed(), a.skipped(), a.errors(), a.total()), (1, 1, 1, 3));
    }
}
