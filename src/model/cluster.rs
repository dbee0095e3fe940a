//! Aggregate state of one ingestion run.

use crate::model::kind::ResourceKind;
use crate::model::reference::{Relationship, ResourceReference};
use crate::model::resource::{HealthStatus, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Namespace bucket used in the summary for resources without a namespace.
pub const CLUSTER_SCOPED: &str = "cluster-scoped";

/// Derived counts over a [`ClusterState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub total_resources: usize,
    pub total_relationships: usize,
    /// Count per kind.
    pub resource_types: BTreeMap<String, usize>,
    /// Count per namespace, with cluster-scoped resources under "cluster-scoped".
    pub namespaces: BTreeMap<String, usize>,
    /// Count per health verdict. Every verdict is present.
    pub health_status: BTreeMap<String, usize>,
    pub analysis_timestamp: String,
}

/// Complete state of analyzed Kubernetes cluster resources.
///
/// Relationships are owned by their source resource. The flattened
/// `relationships` list is a copy, rebuilt by [`ClusterState::rebuild_relationships`]
/// and never appended to directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterState {
    pub resources: Vec<Resource>,
    relationships: Vec<Relationship>,
    pub analysis_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub cluster_info: Map<String, Value>,
    #[serde(default)]
    pub summary: ClusterSummary,
}

impl Default for ClusterState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            relationships: Vec::new(),
            analysis_timestamp: Utc::now(),
            cluster_info: Map::new(),
            summary: ClusterSummary::default(),
        }
    }

    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    /// The flattened relationship list as of the last rebuild.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Replace the flattened relationship list with every resource's current
    /// outbound relationships.
    pub fn rebuild_relationships(&mut self) {
        self.relationships = self
            .resources
            .iter()
            .flat_map(|r| r.relationships.iter().cloned())
            .collect();
    }

    pub fn resources_by_kind(&self, kind: ResourceKind) -> Vec<&Resource> {
        self.resources.iter().filter(|r| r.kind == kind).collect()
    }

    /// Find a resource by reference identity (uid is ignored).
    pub fn resource_by_ref(&self, reference: &ResourceReference) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|r| &r.reference() == reference)
    }

    /// All distinct namespaces, sorted.
    pub fn namespaces(&self) -> BTreeSet<&str> {
        self.resources.iter().filter_map(|r| r.namespace()).collect()
    }

    /// Move another state's resources and cluster info into this one.
    /// The flattened relationship list is left for analysis to rebuild.
    pub fn merge(&mut self, other: ClusterState) {
        self.resources.extend(other.resources);
        self.cluster_info.extend(other.cluster_info);
    }

    /// Recompute and store the summary.
    pub fn generate_summary(&mut self) -> &ClusterSummary {
        let mut resource_types = BTreeMap::new();
        let mut namespaces = BTreeMap::new();
        let mut health_status: BTreeMap<String, usize> = HealthStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();

        for resource in &self.resources {
            *resource_types
                .entry(resource.kind.as_str().to_string())
                .or_insert(0) += 1;

            let ns = resource.namespace().unwrap_or(CLUSTER_SCOPED);
            *namespaces.entry(ns.to_string()).or_insert(0) += 1;

            *health_status
                .entry(resource.health_status.as_str().to_string())
                .or_insert(0) += 1;
        }

        self.summary = ClusterSummary {
            total_resources: self.resources.len(),
            total_relationships: self.relationships.len(),
            resource_types,
            namespaces,
            health_status,
            analysis_timestamp: self.analysis_timestamp.to_rfc3339(),
        };

        &self.summary
    }
}
