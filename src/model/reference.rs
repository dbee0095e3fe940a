//! Resource references and the typed edges between them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Types of relationships between Kubernetes resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Owns,
    Uses,
    Exposes,
    Binds,
    References,
    DependsOn,
    Manages,
    Selects,
}

impl RelationshipType {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owns => "owns",
            Self::Uses => "uses",
            Self::Exposes => "exposes",
            Self::Binds => "binds",
            Self::References => "references",
            Self::DependsOn => "depends_on",
            Self::Manages => "manages",
            Self::Selects => "selects",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction tag of a relationship. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipDirection {
    #[default]
    Outbound,
    Inbound,
    Bidirectional,
}

/// Lightweight identity of a resource, used as a relationship endpoint.
///
/// Equality and hashing use `(api_version, kind, name, namespace)`; the uid
/// is carried along but never compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl ResourceReference {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: Option<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
            namespace,
            uid: None,
        }
    }

    /// Set the uid.
    pub fn with_uid(mut self, uid: Option<String>) -> Self {
        self.uid = uid;
        self
    }
}

impl PartialEq for ResourceReference {
    fn eq(&self, other: &Self) -> bool {
        self.api_version == other.api_version
            && self.kind == other.kind
            && self.name == other.name
            && self.namespace == other.namespace
    }
}

impl Eq for ResourceReference {}

impl Hash for ResourceReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.api_version.hash(state);
        self.kind.hash(state);
        self.name.hash(state);
        self.namespace.hash(state);
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, self.name, ns),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// A directed, typed edge between two resources.
///
/// Relationships are never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: ResourceReference,
    pub target: ResourceReference,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub direction: RelationshipDirection,
    /// What caused the edge (selector, volume name, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl Relationship {
    /// Create an outbound relationship without metadata.
    pub fn new(
        source: ResourceReference,
        target: ResourceReference,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            source,
            target,
            relationship_type,
            direction: RelationshipDirection::Outbound,
            metadata: BTreeMap::new(),
        }
    }

    /// Set the direction tag.
    pub fn with_direction(mut self, direction: RelationshipDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.source, self.relationship_type, self.target
        )
    }
}
