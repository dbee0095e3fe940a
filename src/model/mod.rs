//! Typed resource model.
//!
//! A single concrete [`Resource`] type carries every supported kind; kind
//! specific data is read through the views in [`views`].

pub mod cluster;
pub mod kind;
pub mod metadata;
pub mod reference;
pub mod resource;
pub mod views;

pub use cluster::{CLUSTER_SCOPED, ClusterState, ClusterSummary};
pub use kind::ResourceKind;
pub use metadata::{OwnerReference, ResourceMetadata};
pub use reference::{Relationship, RelationshipDirection, RelationshipType, ResourceReference};
pub use resource::{HealthStatus, Resource};
pub use views::{
    ConfigMapView, IngressBackend, IngressView, NodeView, PodView, PvcView, RoleBindingView,
    ServiceView,
};
