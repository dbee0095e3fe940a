//! The central resource entity.

use crate::model::kind::ResourceKind;
use crate::model::metadata::ResourceMetadata;
use crate::model::reference::{Relationship, RelationshipType, ResourceReference};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Health verdict assigned to every resource by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Error,
    /// Not yet assessed, or not enough status information to decide.
    #[default]
    Unknown,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 4] = [Self::Healthy, Self::Warning, Self::Error, Self::Unknown];

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One Kubernetes object captured in a static export.
///
/// `spec`, `status` and `extra` are the untouched input payloads. Kind
/// specific accessors live in [`crate::model::views`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub api_version: String,
    pub kind: ResourceKind,
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Map<String, Value>>,
    /// Top-level fields other than apiVersion/kind/metadata/spec/status,
    /// e.g. a ConfigMap's `data` or a RoleBinding's `subjects`.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
    /// Relationships this resource is the source of.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub health_status: HealthStatus,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl Resource {
    /// Create a resource with an empty spec and no status.
    pub fn new(kind: ResourceKind, metadata: ResourceMetadata) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind,
            metadata,
            spec: Map::new(),
            status: None,
            extra: Map::new(),
            relationships: Vec::new(),
            health_status: HealthStatus::Unknown,
            issues: Vec::new(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_spec(mut self, spec: Map<String, Value>) -> Self {
        self.spec = spec;
        self
    }

    pub fn with_status(mut self, status: Option<Map<String, Value>>) -> Self {
        self.status = status;
        self
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    /// Reference identifying this resource.
    pub fn reference(&self) -> ResourceReference {
        ResourceReference::new(
            self.api_version.clone(),
            self.kind.as_str(),
            self.metadata.name.clone(),
            self.metadata.namespace.clone(),
        )
        .with_uid(self.metadata.uid.clone())
    }

    /// `Kind/name/namespace`, or `Kind/name` for cluster-scoped resources.
    pub fn full_name(&self) -> String {
        self.reference().to_string()
    }

    /// Look up a payload field in `spec`, falling back to the top level.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.spec.get(key).or_else(|| self.extra.get(key))
    }

    /// Look up a field of the status payload.
    pub fn status_field(&self, key: &str) -> Option<&Value> {
        self.status.as_ref().and_then(|s| s.get(key))
    }

    /// Record a relationship with this resource as its source.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    /// Relationships of a single type.
    pub fn relationships_by_type(&self, relationship_type: RelationshipType) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.relationship_type == relationship_type)
            .collect()
    }

    /// Drop derived state (relationships, verdict, issues) before re-analysis.
    pub fn reset_analysis(&mut self) {
        self.relationships.clear();
        self.issues.clear();
        self.health_status = HealthStatus::Unknown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod() -> Resource {
        Resource::new(
            ResourceKind::Pod,
            ResourceMetadata::new("web", Some("prod".to_string())),
        )
    }

    #[test]
    fn test_full_name() {
        assert_eq!(pod().full_name(), "Pod/web/prod");

        let node = Resource::new(ResourceKind::Node, ResourceMetadata::new("worker-1", None));
        assert_eq!(node.full_name(), "Node/worker-1");
    }

    #[test]
    fn test_field_falls_back_to_top_level() {
        let Value::Object(extra) = json!({"subjects": [{"kind": "ServiceAccount"}]}) else {
            unreachable!()
        };
        let rb = Resource::new(
            ResourceKind::RoleBinding,
            ResourceMetadata::new("rb", Some("prod".to_string())),
        )
        .with_extra(extra);
        assert!(rb.field("subjects").is_some_and(Value::is_array));
        assert!(rb.field("roleRef").is_none());
    }

    #[test]
    fn test_relationships_by_type_and_reset() {
        let mut p = pod();
        let node = ResourceReference::new("v1", "Node", "worker-1", None);
        p.add_relationship(Relationship::new(p.reference(), node, RelationshipType::DependsOn));
        p.issues.push("something".to_string());
        p.health_status = HealthStatus::Warning;

        assert_eq!(p.relationships_by_type(RelationshipType::DependsOn).len(), 1);
        assert!(p.relationships_by_type(RelationshipType::Uses).is_empty());

        p.reset_analysis();
        assert!(p.relationships.is_empty());
        assert!(p.issues.is_empty());
        assert_eq!(p.health_status, HealthStatus::Unknown);
    }

    #[test]
    fn test_health_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(HealthStatus::Warning).unwrap(), json!("warning"));
    }
}
