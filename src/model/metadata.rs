//! Object metadata shared by every resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Kubernetes object metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Set when the object is being deleted; always yields a WARNING verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
    #[serde(default)]
    pub finalizers: Vec<String>,
}

impl ResourceMetadata {
    /// Create metadata with only a name and optional namespace.
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            ..Self::default()
        }
    }

    /// Whether the object carries a deletion timestamp.
    pub fn is_being_deleted(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}

/// An entry of `metadata.ownerReferences`, kept as opaque key-value data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerReference(pub Map<String, Value>);

impl OwnerReference {
    fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.field("kind")
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name")
    }

    pub fn uid(&self) -> Option<&str> {
        self.field("uid")
    }

    pub fn api_version(&self) -> Option<&str> {
        self.field("apiVersion")
    }

    /// Whether the owner is flagged as the managing controller.
    pub fn is_controller(&self) -> bool {
        self.0
            .get("controller")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl From<Map<String, Value>> for OwnerReference {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
