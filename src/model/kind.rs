//! The closed set of resource kinds the parser turns into [`Resource`]s.
//!
//! [`Resource`]: crate::model::Resource

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kubernetes kinds supported by the analyzer.
///
/// Documents of any other kind are skipped during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    // Workloads
    Pod,

    // Services & Networking
    Service,
    Ingress,

    // Configuration
    ConfigMap,

    // Cluster
    Node,
    Namespace,

    // Storage
    PersistentVolume,
    PersistentVolumeClaim,

    // RBAC
    RoleBinding,
    ServiceAccount,
}

impl ResourceKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [ResourceKind; 10] = [
        Self::Pod,
        Self::Service,
        Self::Ingress,
        Self::ConfigMap,
        Self::Node,
        Self::Namespace,
        Self::PersistentVolume,
        Self::PersistentVolumeClaim,
        Self::RoleBinding,
        Self::ServiceAccount,
    ];

    /// Get the string representation matching Kubernetes kind names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Service => "Service",
            Self::Ingress => "Ingress",
            Self::ConfigMap => "ConfigMap",
            Self::Node => "Node",
            Self::Namespace => "Namespace",
            Self::PersistentVolume => "PersistentVolume",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
            Self::RoleBinding => "RoleBinding",
            Self::ServiceAccount => "ServiceAccount",
        }
    }

    /// Parse from a Kubernetes kind string. Matching is exact.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Pod" => Some(Self::Pod),
            "Service" => Some(Self::Service),
            "Ingress" => Some(Self::Ingress),
            "ConfigMap" => Some(Self::ConfigMap),
            "Node" => Some(Self::Node),
            "Namespace" => Some(Self::Namespace),
            "PersistentVolume" => Some(Self::PersistentVolume),
            "PersistentVolumeClaim" => Some(Self::PersistentVolumeClaim),
            "RoleBinding" => Some(Self::RoleBinding),
            "ServiceAccount" => Some(Self::ServiceAccount),
            _ => None,
        }
    }

    /// Check whether a kind string is in the supported allowlist.
    pub fn is_supported(kind: &str) -> bool {
        Self::from_kind(kind).is_some()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
