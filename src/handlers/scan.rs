use crate::analyzer::ResourceAnalyzer;
use crate::config::Config;
use crate::discovery::{DiscoveryOptions, discover_and_parse, find_kubernetes_files};
use crate::handlers::utils::{report, to_json, write_state};
use std::path::Path;

/// Discovery options from the config, overridden by command line flags.
fn options(
    config: &Config,
    patterns: &[String],
    no_recursive: bool,
    max_files: Option<usize>,
) -> DiscoveryOptions {
    let mut options = config.discovery.to_options();
    if !patterns.is_empty() {
        options = options.with_patterns(patterns.to_vec());
    }
    if no_recursive {
        options = options.with_recursive(false);
    }
    if max_files.is_some() {
        options = options.with_max_files(max_files);
    }
    options
}

pub fn handle_scan(
    dir: &Path,
    patterns: &[String],
    no_recursive: bool,
    max_files: Option<usize>,
    analyze: bool,
    output: Option<&Path>,
    config: &Config,
) -> crate::Result<String> {
    let options = options(config, patterns, no_recursive, max_files);
    let (mut state, stats) = discover_and_parse(dir, &options, config.parser.parallel)?;

    if analyze {
        ResourceAnalyzer::new().analyze_cluster(&mut state);
    }
    if let Some(path) = output {
        write_state(&state, path, config.output.pretty)?;
    }
    to_json(&report(&state, &stats), config.output.pretty)
}

pub fn handle_list_files(
    dir: &Path,
    patterns: &[String],
    no_recursive: bool,
    config: &Config,
) -> crate::Result<String> {
    let options = options(config, patterns, no_recursive, None);
    let files = find_kubernetes_files(dir, &options)?;
    Ok(files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}
