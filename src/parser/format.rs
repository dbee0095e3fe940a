//! Input format detection and raw document loading.

use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Serialization format of an export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
    /// No recognizable extension: try JSON, then YAML.
    Unknown,
}

impl InputFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Self::Json,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Unknown,
        }
    }
}

/// The top-level shape of a parsed file.
#[derive(Debug, Clone, PartialEq)]
pub enum Documents {
    /// Exactly one document: a bare resource or a `List` wrapper.
    Single(Value),
    /// A YAML stream with zero or several documents, each an independent resource.
    Stream(Vec<Value>),
}

/// Parse a JSON file body.
pub fn load_json(content: &str) -> Result<Documents> {
    let value: Value = serde_json::from_str(content)?;
    Ok(Documents::Single(value))
}

/// Parse a YAML file body, which may contain several `---` separated documents.
///
/// A stream holding exactly one mapping is returned as [`Documents::Single`]
/// so that `List` wrappers are unwrapped.
pub fn load_yaml(content: &str) -> Result<Documents> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        documents.push(Value::deserialize(document)?);
    }

    if documents.len() == 1 && documents[0].is_object() {
        return Ok(Documents::Single(documents.remove(0)));
    }
    Ok(Documents::Stream(documents))
}

/// Load a file body in the given format. Unknown formats try JSON first
/// and fall back to YAML.
pub fn load_documents(content: &str, format: InputFormat) -> Result<Documents> {
    match format {
        InputFormat::Json => load_json(content),
        InputFormat::Yaml => load_yaml(content),
        InputFormat::Unknown => load_json(content).or_else(|_| load_yaml(content)),
    }
}
