//! Conversion of a single raw document into a typed [`Resource`].

use crate::model::{OwnerReference, Resource, ResourceKind, ResourceMetadata};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Fields lifted out of a document; everything else lands in `Resource::extra`.
const STRUCTURAL_FIELDS: [&str; 5] = ["apiVersion", "kind", "metadata", "spec", "status"];

/// A supported-kind document that is structurally malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("document is not a mapping")]
    NotAMapping,

    #[error("metadata.name is missing or empty")]
    MissingName,

    #[error("invalid field '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Result of looking at one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Parsed(Box<Resource>),
    /// The document has no `kind`.
    MissingKind,
    /// The document's kind is outside the supported allowlist.
    UnsupportedKind(String),
}

/// Turn one document into a resource, or explain why it was not.
pub fn parse_document(value: &Value) -> Result<DocumentOutcome, ResourceError> {
    let Some(doc) = value.as_object() else {
        return Err(ResourceError::NotAMapping);
    };

    let kind = match doc.get("kind") {
        None | Some(Value::Null) => return Ok(DocumentOutcome::MissingKind),
        Some(Value::String(s)) if s.is_empty() => return Ok(DocumentOutcome::MissingKind),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => return Ok(DocumentOutcome::UnsupportedKind(other.to_string())),
    };
    let Some(kind) = ResourceKind::from_kind(kind) else {
        return Ok(DocumentOutcome::UnsupportedKind(kind.to_string()));
    };

    let api_version = match doc.get("apiVersion") {
        None | Some(Value::Null) => "v1".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(invalid("apiVersion", "a string")),
    };

    let metadata = match doc.get("metadata") {
        None | Some(Value::Null) => parse_metadata(&Map::new())?,
        Some(Value::Object(m)) => parse_metadata(m)?,
        Some(_) => return Err(invalid("metadata", "a mapping")),
    };

    let spec = match doc.get("spec") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(m)) => m.clone(),
        Some(_) => return Err(invalid("spec", "a mapping")),
    };

    let status = match doc.get("status") {
        None | Some(Value::Null) => None,
        Some(Value::Object(m)) => Some(m.clone()),
        Some(_) => return Err(invalid("status", "a mapping")),
    };

    let extra: Map<String, Value> = doc
        .iter()
        .filter(|(k, _)| !STRUCTURAL_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let resource = Resource::new(kind, metadata)
        .with_api_version(api_version)
        .with_spec(spec)
        .with_status(status)
        .with_extra(extra);

    Ok(DocumentOutcome::Parsed(Box::new(resource)))
}

fn invalid(field: &'static str, expected: &'static str) -> ResourceError {
    ResourceError::InvalidField { field, expected }
}

/// Parse `metadata`. Timestamp problems are logged and treated as absent.
pub fn parse_metadata(m: &Map<String, Value>) -> Result<ResourceMetadata, ResourceError> {
    let name = match m.get("name") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => return Err(ResourceError::MissingName),
        Some(_) => return Err(invalid("metadata.name", "a string")),
    };

    Ok(ResourceMetadata {
        name,
        namespace: get_string(m, "metadata.namespace", "namespace")?,
        uid: get_string(m, "metadata.uid", "uid")?,
        resource_version: get_scalar_string(m, "metadata.resourceVersion", "resourceVersion")?,
        generation: get_i64(m, "metadata.generation", "generation")?,
        creation_timestamp: m
            .get("creationTimestamp")
            .and_then(|v| parse_timestamp(v, "creationTimestamp")),
        deletion_timestamp: m
            .get("deletionTimestamp")
            .and_then(|v| parse_timestamp(v, "deletionTimestamp")),
        labels: get_string_map(m, "metadata.labels", "labels")?,
        annotations: get_string_map(m, "metadata.annotations", "annotations")?,
        owner_references: get_owner_references(m)?,
        finalizers: get_string_list(m, "metadata.finalizers", "finalizers")?,
    })
}

/// Parse a Kubernetes RFC3339 timestamp. Values without an offset are read as UTC.
pub fn parse_timestamp(value: &Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = match value {
        Value::Null => return None,
        Value::String(s) => s.as_str(),
        other => {
            warn!("Failed to parse timestamp {}: {}", field, other);
            return None;
        }
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    warn!("Failed to parse timestamp {}: {}", field, raw);
    None
}

// ============================================================================
// Field helpers
// ============================================================================

fn get_string(
    m: &Map<String, Value>,
    field: &'static str,
    key: &str,
) -> Result<Option<String>, ResourceError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(field, "a string")),
    }
}

/// Like `get_string`, but accepts numbers (unquoted YAML resource versions).
fn get_scalar_string(
    m: &Map<String, Value>,
    field: &'static str,
    key: &str,
) -> Result<Option<String>, ResourceError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(invalid(field, "a string")),
    }
}

fn get_i64(
    m: &Map<String, Value>,
    field: &'static str,
    key: &str,
) -> Result<Option<i64>, ResourceError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or(invalid(field, "an integer")),
    }
}

fn get_string_map(
    m: &Map<String, Value>,
    field: &'static str,
    key: &str,
) -> Result<BTreeMap<String, String>, ResourceError> {
    let mapping = match m.get(key) {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(mapping)) => mapping,
        Some(_) => return Err(invalid(field, "a mapping of strings")),
    };

    mapping
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k.clone(), s.clone())),
            _ => Err(invalid(field, "a mapping of strings")),
        })
        .collect()
}

fn get_string_list(
    m: &Map<String, Value>,
    field: &'static str,
    key: &str,
) -> Result<Vec<String>, ResourceError> {
    let list = match m.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(list)) => list,
        Some(_) => return Err(invalid(field, "a list of strings")),
    };

    list.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or(invalid(field, "a list of strings"))
        })
        .collect()
}

fn get_owner_references(m: &Map<String, Value>) -> Result<Vec<OwnerReference>, ResourceError> {
    const FIELD: &str = "metadata.ownerReferences";
    let list = match m.get("ownerReferences") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(list)) => list,
        Some(_) => return Err(invalid(FIELD, "a list of mappings")),
    };

    list.iter()
        .map(|v| match v {
            Value::Object(owner) => Ok(OwnerReference::from(owner.clone())),
            _ => Err(invalid(FIELD, "a list of mappings")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn parsed(value: Value) -> Resource {
        match parse_document(&value) {
            Ok(DocumentOutcome::Parsed(resource)) => *resource,
            other => panic!("Expected parsed resource, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_pod_document() {
        let pod = parsed(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "web",
                "namespace": "prod",
                "uid": "u-1",
                "resourceVersion": 42,
                "generation": 3,
                "labels": {"app": "web"},
                "annotations": {"note": "x"},
                "ownerReferences": [{"kind": "ReplicaSet", "name": "web-abc"}],
                "finalizers": ["keep"],
                "creationTimestamp": "2024-01-02T03:04:05Z"
            },
            "spec": {"containers": [{"name": "c"}]},
            "status": {"phase": "Running"}
        }));

        assert_eq!(pod.kind, ResourceKind::Pod);
        assert_eq!(pod.api_version, "v1");
        assert_eq!(pod.name(), "web");
        assert_eq!(pod.namespace(), Some("prod"));
        assert_eq!(pod.metadata.uid.as_deref(), Some("u-1"));
        assert_eq!(pod.metadata.resource_version.as_deref(), Some("42"));
        assert_eq!(pod.metadata.generation, Some(3));
        assert_eq!(pod.metadata.labels["app"], "web");
        assert_eq!(pod.metadata.owner_references[0].kind(), Some("ReplicaSet"));
        assert_eq!(pod.metadata.finalizers, vec!["keep"]);
        let created = pod.metadata.creation_timestamp.unwrap();
        assert_eq!((created.year(), created.hour()), (2024, 3));
        assert!(pod.status.is_some());
        assert!(pod.extra.is_empty());
    }

    #[test]
    fn test_defaults() {
        let cm = parsed(json!({"kind": "ConfigMap", "metadata": {"name": "cfg"}, "data": {"k": "v"}}));
        assert_eq!(cm.api_version, "v1");
        assert!(cm.spec.is_empty());
        assert!(cm.status.is_none());
        assert!(cm.metadata.labels.is_empty());
        assert_eq!(cm.extra["data"]["k"], "v");
    }

    #[test]
    fn test_missing_and_unsupported_kind() {
        assert_eq!(
            parse_document(&json!({"metadata": {"name": "x"}})),
            Ok(DocumentOutcome::MissingKind)
        );
        assert_eq!(
            parse_document(&json!({"kind": "", "metadata": {"name": "x"}})),
            Ok(DocumentOutcome::MissingKind)
        );
        assert_eq!(
            parse_document(&json!({"kind": "Deployment", "metadata": {"name": "x"}})),
            Ok(DocumentOutcome::UnsupportedKind("Deployment".to_string()))
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert_eq!(parse_document(&json!([1, 2])), Err(ResourceError::NotAMapping));
        assert_eq!(
            parse_document(&json!({"kind": "Pod", "metadata": {}})),
            Err(ResourceError::MissingName)
        );
        assert!(matches!(
            parse_document(&json!({"kind": "Pod", "metadata": {"name": "p", "labels": {"a": 1}}})),
            Err(ResourceError::InvalidField { field: "metadata.labels", .. })
        ));
        assert!(matches!(
            parse_document(&json!({"kind": "Pod", "metadata": {"name": "p"}, "spec": "oops"})),
            Err(ResourceError::InvalidField { field: "spec", .. })
        ));
        assert!(matches!(
            parse_document(&json!({"kind": "Pod", "metadata": {"name": "p", "ownerReferences": ["x"]}})),
            Err(ResourceError::InvalidField { field: "metadata.ownerReferences", .. })
        ));
    }

    #[test]
    fn test_bad_timestamp_is_absent_not_fatal() {
        let pod = parsed(json!({
            "kind": "Pod",
            "metadata": {"name": "p", "deletionTimestamp": "yesterday", "creationTimestamp": 5}
        }));
        assert!(pod.metadata.deletion_timestamp.is_none());
        assert!(pod.metadata.creation_timestamp.is_none());
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp(&json!("2024-05-06T07:08:09Z"), "t").is_some());
        assert!(parse_timestamp(&json!("2024-05-06T07:08:09.123+02:00"), "t").is_some());
        let naive = parse_timestamp(&json!("2024-05-06T07:08:09"), "t").unwrap();
        assert_eq!(naive.minute(), 8);
        assert!(parse_timestamp(&json!(null), "t").is_none());
    }
}
