//! Kind-specialized read-only views over a [`Resource`].
//!
//! Views are pure projections of the spec/status payloads. Malformed or
//! missing nested fields read as empty or absent, never as errors.

use crate::model::kind::ResourceKind;
use crate::model::resource::Resource;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const EMPTY: &[Value] = &[];

fn array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(EMPTY)
}

fn string<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Render a scalar the way it would appear in a label value.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Resource {
    pub fn as_pod(&self) -> Option<PodView<'_>> {
        (self.kind == ResourceKind::Pod).then_some(PodView(self))
    }

    pub fn as_service(&self) -> Option<ServiceView<'_>> {
        (self.kind == ResourceKind::Service).then_some(ServiceView(self))
    }

    pub fn as_config_map(&self) -> Option<ConfigMapView<'_>> {
        (self.kind == ResourceKind::ConfigMap).then_some(ConfigMapView(self))
    }

    pub fn as_pvc(&self) -> Option<PvcView<'_>> {
        (self.kind == ResourceKind::PersistentVolumeClaim).then_some(PvcView(self))
    }

    pub fn as_node(&self) -> Option<NodeView<'_>> {
        (self.kind == ResourceKind::Node).then_some(NodeView(self))
    }

    pub fn as_role_binding(&self) -> Option<RoleBindingView<'_>> {
        (self.kind == ResourceKind::RoleBinding).then_some(RoleBindingView(self))
    }

    pub fn as_ingress(&self) -> Option<IngressView<'_>> {
        (self.kind == ResourceKind::Ingress).then_some(IngressView(self))
    }
}

/// Pod projections.
#[derive(Debug, Clone, Copy)]
pub struct PodView<'a>(&'a Resource);

impl<'a> PodView<'a> {
    pub fn resource(&self) -> &'a Resource {
        self.0
    }

    pub fn containers(&self) -> &'a [Value] {
        array(self.0.spec.get("containers"))
    }

    pub fn volumes(&self) -> &'a [Value] {
        array(self.0.spec.get("volumes"))
    }

    /// Find a pod volume by name.
    pub fn volume(&self, name: &str) -> Option<&'a Value> {
        self.volumes()
            .iter()
            .find(|v| string(v, "name") == Some(name))
    }

    /// `serviceAccountName`, then the deprecated `serviceAccount`, then "default".
    pub fn service_account(&self) -> &'a str {
        self.0
            .spec
            .get("serviceAccountName")
            .or_else(|| self.0.spec.get("serviceAccount"))
            .and_then(Value::as_str)
            .unwrap_or("default")
    }

    /// Node the pod is scheduled on.
    pub fn node_name(&self) -> Option<&'a str> {
        self.0
            .spec
            .get("nodeName")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
    }

    pub fn phase(&self) -> Option<&'a str> {
        self.0.status_field("phase").and_then(Value::as_str)
    }

    pub fn container_statuses(&self) -> &'a [Value] {
        array(self.0.status_field("containerStatuses"))
    }
}

/// Service projections.
#[derive(Debug, Clone, Copy)]
pub struct ServiceView<'a>(&'a Resource);

impl<'a> ServiceView<'a> {
    pub fn resource(&self) -> &'a Resource {
        self.0
    }

    /// Label selector. Non-scalar values are ignored.
    pub fn selector(&self) -> BTreeMap<String, String> {
        self.0
            .spec
            .get("selector")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn ports(&self) -> &'a [Value] {
        array(self.0.spec.get("ports"))
    }

    /// `spec.type`, e.g. "ClusterIP" or "LoadBalancer".
    pub fn service_type(&self) -> Option<&'a str> {
        self.0.spec.get("type").and_then(Value::as_str)
    }

    /// `status.loadBalancer`, when declared.
    pub fn load_balancer(&self) -> Option<&'a Value> {
        self.0.status_field("loadBalancer")
    }

    pub fn load_balancer_ingress(&self) -> &'a [Value] {
        array(self.load_balancer().and_then(|lb| lb.get("ingress")))
    }
}

/// ConfigMap projections.
#[derive(Debug, Clone, Copy)]
pub struct ConfigMapView<'a>(&'a Resource);

impl<'a> ConfigMapView<'a> {
    /// String entries of `data`.
    pub fn data(&self) -> BTreeMap<&'a str, &'a str> {
        self.0
            .field("data")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// PersistentVolumeClaim projections.
#[derive(Debug, Clone, Copy)]
pub struct PvcView<'a>(&'a Resource);

impl<'a> PvcView<'a> {
    pub fn storage_class(&self) -> Option<&'a str> {
        self.0.spec.get("storageClassName").and_then(Value::as_str)
    }

    pub fn access_modes(&self) -> Vec<&'a str> {
        array(self.0.spec.get("accessModes"))
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    /// Name of the bound PersistentVolume (`status.volumeName`).
    pub fn bound_volume_name(&self) -> Option<&'a str> {
        self.0
            .status_field("volumeName")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
    }
}

/// Node projections.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a>(&'a Resource);

impl<'a> NodeView<'a> {
    pub fn addresses(&self) -> &'a [Value] {
        array(self.0.status_field("addresses"))
    }

    pub fn conditions(&self) -> &'a [Value] {
        array(self.0.status_field("conditions"))
    }
}

/// RoleBinding projections.
#[derive(Debug, Clone, Copy)]
pub struct RoleBindingView<'a>(&'a Resource);

impl<'a> RoleBindingView<'a> {
    pub fn subjects(&self) -> &'a [Value] {
        array(self.0.field("subjects"))
    }

    pub fn role_ref(&self) -> Option<&'a Map<String, Value>> {
        self.0.field("roleRef").and_then(Value::as_object)
    }
}

/// A Service an Ingress routes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressBackend<'a> {
    /// HTTP path of the rule, or "default" for the default backend.
    pub path: &'a str,
    pub service: &'a str,
}

/// Ingress projections.
#[derive(Debug, Clone, Copy)]
pub struct IngressView<'a>(&'a Resource);

impl<'a> IngressView<'a> {
    /// Backend services of the default backend and every HTTP rule path.
    pub fn backends(&self) -> Vec<IngressBackend<'a>> {
        let mut backends = Vec::new();
        let spec = &self.0.spec;

        let default = spec.get("defaultBackend").or_else(|| spec.get("backend"));
        if let Some(service) = default.and_then(backend_service_name) {
            backends.push(IngressBackend {
                path: "default",
                service,
            });
        }

        for rule in array(spec.get("rules")) {
            let paths = array(rule.get("http").and_then(|h| h.get("paths")));
            for path in paths {
                let Some(service) = path.get("backend").and_then(backend_service_name) else {
                    continue;
                };
                backends.push(IngressBackend {
                    path: string(path, "path").unwrap_or("/"),
                    service,
                });
            }
        }

        backends
    }
}

/// `backend.service.name` (networking/v1) or `backend.serviceName` (legacy).
fn backend_service_name(backend: &Value) -> Option<&str> {
    backend
        .get("service")
        .and_then(|s| string(s, "name"))
        .or_else(|| string(backend, "serviceName"))
}
