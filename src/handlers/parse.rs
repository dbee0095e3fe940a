use crate::analyzer::ResourceAnalyzer;
use crate::config::Config;
use crate::handlers::utils::{report, to_json, write_state};
use crate::model::ClusterState;
use crate::parser::{ParseStats, ResourceParser};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A resource with at least one health issue.
#[derive(Debug, Serialize)]
pub struct ResourceIssues<'a> {
    pub resource: String,
    pub issues: &'a [String],
}

fn parse_inputs(
    file: &Path,
    additional: &[PathBuf],
    config: &Config,
) -> crate::Result<(ClusterState, ParseStats)> {
    let mut parser = ResourceParser::new().with_parallel(config.parser.parallel);
    let state = parser.parse_export_files(file, additional)?;
    Ok((state, parser.stats()))
}

pub fn handle_parse(file: &Path, additional: &[PathBuf], config: &Config) -> crate::Result<String> {
    let (state, stats) = parse_inputs(file, additional, config)?;
    to_json(&report(&state, &stats), config.output.pretty)
}

pub fn handle_analyze(
    file: &Path,
    additional: &[PathBuf],
    output: Option<&Path>,
    config: &Config,
) -> crate::Result<String> {
    let (mut state, stats) = parse_inputs(file, additional, config)?;
    ResourceAnalyzer::new().analyze_cluster(&mut state);

    if let Some(path) = output {
        write_state(&state, path, config.output.pretty)?;
    }
    to_json(&report(&state, &stats), config.output.pretty)
}

/// Every analyzed resource that reported issues, in input order.
pub fn collect_issues(state: &ClusterState) -> Vec<ResourceIssues<'_>> {
    state
        .resources
        .iter()
        .filter(|r| !r.issues.is_empty())
        .map(|r| ResourceIssues {
            resource: r.full_name(),
            issues: &r.issues,
        })
        .collect()
}

pub fn handle_validate(
    file: &Path,
    additional: &[PathBuf],
    config: &Config,
) -> crate::Result<String> {
    let (mut state, _) = parse_inputs(file, additional, config)?;
    ResourceAnalyzer::new().analyze_cluster(&mut state);

    let findings = collect_issues(&state);
    info!("Found {} resources with issues", findings.len());
    to_json(&findings, config.output.pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    const EXPORT: &str = r#"{
        "kind": "List",
        "items": [
            {"kind": "Pod", "metadata": {"name": "p1", "namespace": "ns", "labels": {"app": "web"}},
             "status": {"phase": "Pending"}},
            {"kind": "Service", "metadata": {"name": "web", "namespace": "ns"},
             "spec": {"selector": {"app": "web"}}},
            {"kind": "Deployment", "metadata": {"name": "web", "namespace": "ns"}}
        ]
    }"#;

    #[test]
    fn test_handle_parse_reports_counts() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("export.json");
        fs::write(&file, EXPORT).unwrap();

        let out = handle_parse(&file, &[], &Config::default()).unwrap();
        let report: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["stats"]["parsed"], 2);
        assert_eq!(report["stats"]["skipped"], 1);
        assert_eq!(report["summary"]["total_resources"], 2);
        assert_eq!(report["summary"]["total_relationships"], 0);
    }

    #[test]
    fn test_handle_analyze_writes_state() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("export.json");
        let out_file = dir.path().join("state.json");
        fs::write(&file, EXPORT).unwrap();

        let out = handle_analyze(&file, &[], Some(&out_file), &Config::default()).unwrap();
        let report: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["summary"]["total_relationships"], 2);
        assert_eq!(report["summary"]["health_status"]["warning"], 1);

        let state: Value = serde_json::from_str(&fs::read_to_string(&out_file).unwrap()).unwrap();
        assert_eq!(state["resources"].as_array().map(Vec::len), Some(2));
        assert_eq!(state["resources"][0]["issues"][0], "Pod is in Pending phase");
    }

    #[test]
    fn test_handle_validate_lists_resources_with_issues() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("export.json");
        let extra = dir.path().join("node.yaml");
        fs::write(&file, EXPORT).unwrap();
        fs::write(
            &extra,
            "kind: Node\nmetadata:\n  name: worker-1\nstatus:\n  conditions:\n    - type: Ready\n      status: \"False\"\n",
        )
        .unwrap();

        let out = handle_validate(&file, &[extra], &Config::default()).unwrap();
        let findings: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            findings,
            serde_json::json!([
                {"resource": "Pod/p1/ns", "issues": ["Pod is in Pending phase"]},
                {"resource": "Node/worker-1", "issues": ["Condition Ready is False"]}
            ])
        );
    }

    #[test]
    fn test_handle_validate_clean_export() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cm.yaml");
        fs::write(&file, "kind: ConfigMap\nmetadata:\n  name: c\n  namespace: ns\n").unwrap();

        let out = handle_validate(&file, &[], &Config::default()).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_handle_parse_missing_file() {
        let err = handle_parse(Path::new("/no/such/export.json"), &[], &Config::default());
        assert!(err.is_err());
    }
}
