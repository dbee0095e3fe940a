use crate::error::{AnalyzerError, Result};
use crate::model::ClusterState;
use crate::parser::ParseStats;
use log::info;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

/// Render a value as JSON, pretty or compact.
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

/// Write the full cluster state as JSON.
pub fn write_state(state: &ClusterState, path: &Path, pretty: bool) -> Result<()> {
    let content = to_json(state, pretty)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalyzerError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| AnalyzerError::io(path, e))?;
    info!("Cluster state written to {}", path.display());
    Ok(())
}

/// The report printed by the parse, analyze and scan commands.
pub fn report(state: &ClusterState, stats: &ParseStats) -> Value {
    json!({
        "stats": {
            "parsed": stats.parsed(),
            "skipped": stats.skipped(),
            "errors": stats.errors(),
            "total": stats.total(),
        },
        "summary": state.summary,
    })
}
