pub mod types;

use crate::error::{AnalyzerError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub use types::Config;

pub const CONFIG_FILE_NAME: &str = ".k8s-analyzer.toml";

/// Get the global config file path (~/.k8s-analyzer.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (dir/.k8s-analyzer.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

fn read_config(path: &Path) -> Option<Config> {
    if !path.exists() {
        return None;
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Ignoring unreadable config {}: {}", path.display(), e);
            return None;
        }
    };
    match toml::from_str(&content) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Ignoring invalid config {}: {}", path.display(), e);
            None
        }
    }
}

/// Load configuration from file or use defaults
/// Checks local config first, then global config
pub fn load_config(dir: Option<&Path>) -> Result<Config> {
    if let Some(config) = dir.and_then(|d| read_config(&local_config_path(d))) {
        return Ok(config);
    }

    if let Some(config) = global_config_path().and_then(|g| read_config(&g)) {
        return Ok(config);
    }

    Ok(Config::default())
}

/// Save configuration to dir/.k8s-analyzer.toml
pub fn save_config(dir: &Path, config: &Config) -> Result<PathBuf> {
    let path = local_config_path(dir);
    let content =
        toml::to_string_pretty(config).map_err(|e| AnalyzerError::Config(e.to_string()))?;
    fs::write(&path, content).map_err(|e| AnalyzerError::io(&path, e))?;
    Ok(path)
}
