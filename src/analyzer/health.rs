//! Per-resource health rules.

use crate::model::{HealthStatus, PodView, Resource, ServiceView};
use serde_json::{Map, Value};

/// Restart count above which a running container is flagged.
pub const HIGH_RESTART_COUNT: i64 = 5;

/// Condition types whose "False" status marks a resource as broken.
const CRITICAL_CONDITIONS: &[&str] = &["Ready", "Available", "Progressing"];

/// A verdict and the issues that explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub status: HealthStatus,
    pub issues: Vec<String>,
}

impl Assessment {
    fn healthy() -> Self {
        Self::with(HealthStatus::Healthy, None)
    }

    fn with(status: HealthStatus, issue: Option<String>) -> Self {
        Self {
            status,
            issues: issue.into_iter().collect(),
        }
    }

    fn warning(issue: impl Into<String>) -> Self {
        Self::with(HealthStatus::Warning, Some(issue.into()))
    }

    fn error(issue: impl Into<String>) -> Self {
        Self::with(HealthStatus::Error, Some(issue.into()))
    }
}

/// Assess one resource. Rules stop at the first non-healthy finding.
pub fn assess(resource: &Resource) -> Assessment {
    if resource.metadata.is_being_deleted() {
        return Assessment::warning("Resource is being deleted");
    }

    if let Some(pod) = resource.as_pod() {
        return assess_pod(&pod);
    }
    if let Some(service) = resource.as_service() {
        return assess_service(&service);
    }
    assess_conditions(resource)
}

/// Assess a resource in place, replacing any earlier verdict.
pub fn apply(resource: &mut Resource) {
    let Assessment { status, issues } = assess(resource);
    resource.health_status = status;
    resource.issues = issues;
}

fn assess_pod(pod: &PodView<'_>) -> Assessment {
    if pod.resource().status.as_ref().is_none_or(Map::is_empty) {
        return Assessment::with(HealthStatus::Unknown, None);
    }

    match pod.phase() {
        Some("Failed") => Assessment::error("Pod is in Failed phase"),
        Some("Pending") => Assessment::warning("Pod is in Pending phase"),
        Some("Running") => {
            for status in pod.container_statuses() {
                let name = status.get("name").and_then(Value::as_str).unwrap_or("unknown");
                let ready = status.get("ready").and_then(Value::as_bool).unwrap_or(false);
                if !ready {
                    return Assessment::warning(format!("Container {} is not ready", name));
                }
                let restarts = status
                    .get("restartCount")
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                if restarts > HIGH_RESTART_COUNT {
                    return Assessment::warning(format!(
                        "Container {} has high restart count",
                        name
                    ));
                }
            }
            Assessment::healthy()
        }
        _ => Assessment::healthy(),
    }
}

fn assess_service(service: &ServiceView<'_>) -> Assessment {
    // A declared loadBalancer status block without ingress is flagged
    // regardless of the service type.
    if service.load_balancer().is_some() && service.load_balancer_ingress().is_empty() {
        return Assessment::warning("LoadBalancer service has no ingress");
    }
    if service.selector().is_empty() {
        return Assessment::warning("Service has no selector");
    }
    Assessment::healthy()
}

fn assess_conditions(resource: &Resource) -> Assessment {
    let conditions = resource
        .status_field("conditions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();

    for condition in conditions {
        let Some(kind) = condition.get("type").and_then(Value::as_str) else {
            continue;
        };
        let failed = condition.get("status").and_then(Value::as_str) == Some("False");
        if failed && CRITICAL_CONDITIONS.contains(&kind) {
            return Assessment::error(format!("Condition {} is False", kind));
        }
    }
    Assessment::healthy()
}
