use crate::discovery::DiscoveryOptions;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

/// File discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File name glob patterns. Unset means the built-in list for
    /// directories and no filtering for a single-file root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    pub recursive: bool,
    /// Maximum number of files to parse in one scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Parse batch files on a worker pool
    pub parallel: bool,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            patterns: None,
            recursive: true,
            max_files: None,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl DiscoveryConfig {
    /// Discovery options described by this section
    pub fn to_options(&self) -> DiscoveryOptions {
        let options = DiscoveryOptions::new()
            .with_recursive(self.recursive)
            .with_max_files(self.max_files);
        match &self.patterns {
            Some(patterns) => options.with_patterns(patterns.clone()),
            None => options,
        }
    }
}
