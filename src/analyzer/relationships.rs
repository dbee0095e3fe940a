//! Relationship inference passes.
//!
//! Each pass reads the resource slice and the shared index and returns the
//! edges it found, tagged with the position of the source resource. Passes
//! never mutate anything, so they can run concurrently.

use crate::analyzer::index::ResourceIndex;
use crate::model::{
    PodView, Relationship, RelationshipDirection, RelationshipType, Resource, ResourceKind,
    ResourceReference,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A discovered relationship and the position of its source resource.
pub type Edge = (usize, Relationship);

/// An independent, additive relationship inference pass.
pub trait InferencePass: Send + Sync {
    /// Short identifier used in log output.
    fn name(&self) -> &'static str;

    /// Find edges. Unresolvable references yield no edge.
    fn infer(&self, resources: &[Resource], index: &ResourceIndex) -> Vec<Edge>;
}

/// The passes run by the analyzer, in application order.
pub fn builtin_passes() -> Vec<Box<dyn InferencePass>> {
    vec![
        Box::new(OwnershipPass),
        Box::new(ServiceSelectionPass),
        Box::new(PodDependencyPass),
        Box::new(StorageBindingPass),
        Box::new(RbacPass),
        Box::new(IngressRoutingPass),
    ]
}

/// Every selector key must be present in `labels` with an identical value.
/// Extra labels are irrelevant.
pub fn labels_match_selector(
    labels: &BTreeMap<String, String>,
    selector: &BTreeMap<String, String>,
) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

fn list<'a>(value: Option<&'a Value>) -> impl Iterator<Item = &'a Value> {
    value.and_then(Value::as_array).into_iter().flatten()
}

fn name_at<'a>(value: &'a Value, parent: &str, key: &str) -> Option<&'a str> {
    value
        .get(parent)
        .and_then(|p| p.get(key))
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
}

/// Owner references become DEPENDS_ON edges whether or not the owner is
/// part of the export.
pub struct OwnershipPass;

impl InferencePass for OwnershipPass {
    fn name(&self) -> &'static str {
        "ownership"
    }

    fn infer(&self, resources: &[Resource], _index: &ResourceIndex) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (i, resource) in resources.iter().enumerate() {
            for owner in &resource.metadata.owner_references {
                let (Some(kind), Some(name)) = (owner.kind(), owner.name()) else {
                    continue;
                };
                if kind.is_empty() || name.is_empty() {
                    continue;
                }

                let target = ResourceReference::new(
                    owner.api_version().unwrap_or("v1"),
                    kind,
                    name,
                    resource.metadata.namespace.clone(),
                )
                .with_uid(owner.uid().map(str::to_string));

                edges.push((
                    i,
                    Relationship::new(resource.reference(), target, RelationshipType::DependsOn)
                        .with_metadata("owner_reference", true),
                ));
            }
        }
        edges
    }
}

/// Services select the pods of their namespace whose labels satisfy the
/// selector; each selected pod gets the inverse EXPOSES edge.
pub struct ServiceSelectionPass;

impl InferencePass for ServiceSelectionPass {
    fn name(&self) -> &'static str {
        "service-selection"
    }

    fn infer(&self, resources: &[Resource], _index: &ResourceIndex) -> Vec<Edge> {
        let pods: Vec<(usize, &Resource)> = resources
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == ResourceKind::Pod)
            .collect();

        let mut edges = Vec::new();
        for (i, service) in resources.iter().enumerate() {
            let Some(view) = service.as_service() else {
                continue;
            };
            let selector = view.selector();
            if selector.is_empty() {
                continue;
            }
            let selector_value: Map<String, Value> = selector
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                .collect();

            for &(j, pod) in &pods {
                if pod.namespace() != service.namespace()
                    || !labels_match_selector(&pod.metadata.labels, &selector)
                {
                    continue;
                }

                edges.push((
                    i,
                    Relationship::new(service.reference(), pod.reference(), RelationshipType::Selects)
                        .with_metadata("selector", Value::Object(selector_value.clone())),
                ));
                edges.push((
                    j,
                    Relationship::new(pod.reference(), service.reference(), RelationshipType::Exposes)
                        .with_direction(RelationshipDirection::Inbound),
                ));
            }
        }
        edges
    }
}

/// Pod dependencies: config and secret references, claims, the service
/// account and the scheduled node.
pub struct PodDependencyPass;

impl PodDependencyPass {
    fn resolve(
        resources: &[Resource],
        index: &ResourceIndex,
        kind: &str,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<ResourceReference> {
        index
            .lookup(kind, namespace, name)
            .map(|j| resources[j].reference())
    }

    /// `(kind, name)` of every ConfigMap and Secret a pod's containers read,
    /// through env `valueFrom` entries and mounted volumes.
    fn config_refs<'a>(pod: &PodView<'a>) -> Vec<(&'static str, &'a str)> {
        let mut refs = Vec::new();
        for container in pod.containers() {
            for env in list(container.get("env")) {
                let Some(value_from) = env.get("valueFrom") else {
                    continue;
                };
                if let Some(name) = name_at(value_from, "configMapKeyRef", "name") {
                    refs.push(("ConfigMap", name));
                }
                if let Some(name) = name_at(value_from, "secretKeyRef", "name") {
                    refs.push(("Secret", name));
                }
            }

            for mount in list(container.get("volumeMounts")) {
                let Some(volume) = mount
                    .get("name")
                    .and_then(Value::as_str)
                    .and_then(|name| pod.volume(name))
                else {
                    continue;
                };
                if let Some(name) = name_at(volume, "configMap", "name") {
                    refs.push(("ConfigMap", name));
                }
                if let Some(name) = name_at(volume, "secret", "secretName") {
                    refs.push(("Secret", name));
                }
            }
        }
        refs
    }
}

impl InferencePass for PodDependencyPass {
    fn name(&self) -> &'static str {
        "pod-dependencies"
    }

    fn infer(&self, resources: &[Resource], index: &ResourceIndex) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (i, resource) in resources.iter().enumerate() {
            let Some(pod) = resource.as_pod() else {
                continue;
            };
            let ns = resource.namespace();
            let source = resource.reference();

            for (kind, name) in Self::config_refs(&pod) {
                if let Some(target) = Self::resolve(resources, index, kind, ns, name) {
                    edges.push((
                        i,
                        Relationship::new(source.clone(), target, RelationshipType::Uses),
                    ));
                }
            }

            for volume in pod.volumes() {
                let Some(claim) = name_at(volume, "persistentVolumeClaim", "claimName") else {
                    continue;
                };
                let Some(target) =
                    Self::resolve(resources, index, ResourceKind::PersistentVolumeClaim.as_str(), ns, claim)
                else {
                    continue;
                };
                let volume_name = volume.get("name").cloned().unwrap_or(Value::Null);
                edges.push((
                    i,
                    Relationship::new(source.clone(), target, RelationshipType::Uses)
                        .with_metadata("volume_name", volume_name),
                ));
            }

            let account = pod.service_account();
            if !account.is_empty() && account != "default" {
                if let Some(target) = Self::resolve(
                    resources,
                    index,
                    ResourceKind::ServiceAccount.as_str(),
                    ns,
                    account,
                ) {
                    edges.push((
                        i,
                        Relationship::new(source.clone(), target, RelationshipType::Uses),
                    ));
                }
            }

            if let Some(node) = pod.node_name() {
                if let Some(target) =
                    Self::resolve(resources, index, ResourceKind::Node.as_str(), None, node)
                {
                    edges.push((
                        i,
                        Relationship::new(source.clone(), target, RelationshipType::DependsOn)
                            .with_metadata("scheduled", true),
                    ));
                }
            }
        }
        edges
    }
}

/// Bound claims BIND to their cluster-scoped PersistentVolume.
pub struct StorageBindingPass;

impl InferencePass for StorageBindingPass {
    fn name(&self) -> &'static str {
        "storage-binding"
    }

    fn infer(&self, resources: &[Resource], index: &ResourceIndex) -> Vec<Edge> {
        resources
            .iter()
            .enumerate()
            .filter_map(|(i, resource)| {
                let volume = resource.as_pvc()?.bound_volume_name()?;
                let j = index.lookup(ResourceKind::PersistentVolume.as_str(), None, volume)?;
                Some((
                    i,
                    Relationship::new(
                        resource.reference(),
                        resources[j].reference(),
                        RelationshipType::Binds,
                    ),
                ))
            })
            .collect()
    }
}

/// RoleBindings REFERENCE their ServiceAccount subjects.
pub struct RbacPass;

impl InferencePass for RbacPass {
    fn name(&self) -> &'static str {
        "rbac"
    }

    fn infer(&self, resources: &[Resource], index: &ResourceIndex) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (i, resource) in resources.iter().enumerate() {
            let Some(binding) = resource.as_role_binding() else {
                continue;
            };
            for subject in binding.subjects() {
                if subject.get("kind").and_then(Value::as_str) != Some("ServiceAccount") {
                    continue;
                }
                let Some(name) = subject.get("name").and_then(Value::as_str) else {
                    continue;
                };
                let namespace = subject
                    .get("namespace")
                    .and_then(Value::as_str)
                    .or(resource.namespace());

                if let Some(j) =
                    index.lookup(ResourceKind::ServiceAccount.as_str(), namespace, name)
                {
                    edges.push((
                        i,
                        Relationship::new(
                            resource.reference(),
                            resources[j].reference(),
                            RelationshipType::References,
                        )
                        .with_metadata("subject", true),
                    ));
                }
            }
        }
        edges
    }
}

/// Ingresses REFERENCE the backend Services they route to.
pub struct IngressRoutingPass;

impl InferencePass for IngressRoutingPass {
    fn name(&self) -> &'static str {
        "ingress-routing"
    }

    fn infer(&self, resources: &[Resource], index: &ResourceIndex) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (i, resource) in resources.iter().enumerate() {
            let Some(ingress) = resource.as_ingress() else {
                continue;
            };
            for backend in ingress.backends() {
                let Some(j) = index.lookup(
                    ResourceKind::Service.as_str(),
                    resource.namespace(),
                    backend.service,
                ) else {
                    continue;
                };
                edges.push((
                    i,
                    Relationship::new(
                        resource.reference(),
                        resources[j].reference(),
                        RelationshipType::References,
                    )
                    .with_metadata("backend", backend.path),
                ));
            }
        }
        edges
    }
}
