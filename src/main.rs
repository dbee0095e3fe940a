use clap::Parser;
use k8s_analyzer::{cli::Cli, config, run_command};
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> k8s_analyzer::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let config_dir = cli.config.clone().unwrap_or_else(|| ".".into());
    let config = config::load_config(Some(config_dir.as_path()))?;

    let output = run_command(cli.command, &config)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
