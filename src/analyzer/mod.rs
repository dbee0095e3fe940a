//! # Analyzer Module
//!
//! Infers relationships between parsed resources and assigns each one a
//! health verdict:
//! - ownership, service selection, pod dependencies, storage binding,
//!   RBAC subjects and ingress routing edges
//! - per-kind health rules with human readable issues

pub mod health;
pub mod index;
pub mod relationships;

pub use health::{Assessment, assess};
pub use index::{ResourceIndex, index_key};
pub use relationships::{Edge, InferencePass, builtin_passes, labels_match_selector};

use crate::model::ClusterState;
use log::{debug, info};
use rayon::prelude::*;

/// Runs the inference passes and health rules over a [`ClusterState`].
pub struct ResourceAnalyzer {
    passes: Vec<Box<dyn InferencePass>>,
    parallel: bool,
}

impl Default for ResourceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceAnalyzer {
    /// Analyzer with every built-in pass, run in parallel.
    pub fn new() -> Self {
        Self {
            passes: builtin_passes(),
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Analyze the cluster in place.
    ///
    /// Earlier relationships, issues and verdicts are discarded first, so
    /// running this repeatedly gives the same result as running it once.
    pub fn analyze_cluster<'a>(&self, cluster: &'a mut ClusterState) -> &'a mut ClusterState {
        info!("Analyzing {} resources", cluster.resources.len());

        for resource in &mut cluster.resources {
            resource.reset_analysis();
        }

        let index = ResourceIndex::build(&cluster.resources);
        let resources = &cluster.resources;
        let found: Vec<Vec<Edge>> = if self.parallel {
            self.passes
                .par_iter()
                .map(|pass| pass.infer(resources, &index))
                .collect()
        } else {
            self.passes
                .iter()
                .map(|pass| pass.infer(resources, &index))
                .collect()
        };

        let mut total = 0;
        for (pass, edges) in self.passes.iter().zip(found) {
            debug!("Pass {} found {} relationships", pass.name(), edges.len());
            total += edges.len();
            for (source, relationship) in edges {
                cluster.resources[source].add_relationship(relationship);
            }
        }

        cluster.rebuild_relationships();

        for resource in &mut cluster.resources {
            health::apply(resource);
        }

        cluster.generate_summary();
        info!("Analysis complete: {} relationships found", total);
        cluster
    }
}
