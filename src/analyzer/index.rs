//! Name lookup over the parsed resource set.

use crate::model::Resource;
use std::collections::HashMap;

/// Canonical lookup key: `Kind/namespace/name`, or `Kind/name` when the
/// resource is cluster-scoped.
pub fn index_key(kind: &str, namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}/{}/{}", kind, ns, name),
        None => format!("{}/{}", kind, name),
    }
}

/// Read-only index from canonical key to position in the resource slice.
///
/// Built once per analysis run. Later duplicates of the same key win.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    entries: HashMap<String, usize>,
}

impl ResourceIndex {
    pub fn build(resources: &[Resource]) -> Self {
        let entries = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (index_key(r.kind.as_str(), r.namespace(), r.name()), i))
            .collect();
        Self { entries }
    }

    /// Position of the resource with this identity, if present.
    pub fn lookup(&self, kind: &str, namespace: Option<&str>, name: &str) -> Option<usize> {
        self.entries
            .get(&index_key(kind, namespace, name))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
