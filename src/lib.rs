//! # k8s-analyzer
//!
//! Static analysis of Kubernetes cluster exports. Files produced by
//! `kubectl get -o json|yaml` are parsed into typed resources, the
//! relationships between those resources are inferred, and every resource
//! is given a health verdict.
//!
//! ## Features
//!
//! - **Format Detection**: JSON, YAML, multi-document YAML and `List` wrappers
//! - **File Discovery**: glob-based scanning of export directories
//! - **Relationship Inference**: ownership, selectors, config/storage/RBAC references
//! - **Health Assessment**: per-kind rules with human readable issues
//!
//! ## Example
//!
//! ```rust,no_run
//! use k8s_analyzer::{ResourceAnalyzer, parse_kubectl_export};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (mut state, stats) = parse_kubectl_export(Path::new("cluster.json"), &[])?;
//! ResourceAnalyzer::new().analyze_cluster(&mut state);
//! println!("{} resources, {} errors", state.resources.len(), stats.errors());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod model;
pub mod parser;

// Re-export commonly used types and functions
pub use analyzer::ResourceAnalyzer;
pub use discovery::{DiscoveryOptions, discover_and_parse, find_kubernetes_files};
pub use error::{AnalyzerError, Result};
pub use model::{
    ClusterState, HealthStatus, Relationship, RelationshipType, Resource, ResourceKind,
    ResourceReference,
};
pub use parser::{ParseStats, ResourceParser, parse_kubectl_export};

use cli::Commands;
use config::Config;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a command and return its printable output.
pub fn run_command(command: Commands, config: &Config) -> Result<String> {
    match command {
        Commands::Parse { file, additional } => handlers::handle_parse(&file, &additional, config),
        Commands::Analyze {
            file,
            additional,
            output,
        } => handlers::handle_analyze(&file, &additional, output.as_deref(), config),
        Commands::Validate { file, additional } => {
            handlers::handle_validate(&file, &additional, config)
        }
        Commands::Scan {
            dir,
            patterns,
            no_recursive,
            max_files,
            analyze,
            output,
        } => handlers::handle_scan(
            &dir,
            &patterns,
            no_recursive,
            max_files,
            analyze,
            output.as_deref(),
            config,
        ),
        Commands::ListFiles {
            dir,
            patterns,
            no_recursive,
        } => handlers::handle_list_files(&dir, &patterns, no_recursive, config),
    }
}
