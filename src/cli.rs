use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "k8s-analyzer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analyze static Kubernetes exports")]
#[command(long_about = "Parses kubectl exports (JSON, YAML, multi-document YAML or List wrappers), infers the relationships between resources and assigns each resource a health verdict.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding a .k8s-analyzer.toml (defaults to the current directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Parse an export file and report counts
    Parse {
        /// Export file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Additional export files to merge
        #[arg(short, long = "additional", value_name = "FILE")]
        additional: Vec<PathBuf>,
    },

    /// Parse an export file and infer relationships and health
    Analyze {
        /// Export file to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Additional export files to merge
        #[arg(short, long = "additional", value_name = "FILE")]
        additional: Vec<PathBuf>,

        /// Write the full analyzed state as JSON to this file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Analyze an export file and list every resource with issues
    Validate {
        /// Export file to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Additional export files to merge
        #[arg(short, long = "additional", value_name = "FILE")]
        additional: Vec<PathBuf>,
    },

    /// Discover export files in a directory and parse them together
    Scan {
        /// Directory (or single file) to scan
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// File name patterns (repeatable)
        #[arg(short, long = "pattern", value_name = "GLOB")]
        patterns: Vec<String>,

        /// Only look at the top level of the directory
        #[arg(long)]
        no_recursive: bool,

        /// Maximum number of files to parse
        #[arg(short, long, value_name = "N")]
        max_files: Option<usize>,

        /// Also infer relationships and health
        #[arg(long)]
        analyze: bool,

        /// Write the full state as JSON to this file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// List the export files a scan would parse
    ListFiles {
        /// Directory (or single file) to scan
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// File name patterns (repeatable)
        #[arg(short, long = "pattern", value_name = "GLOB")]
        patterns: Vec<String>,

        /// Only look at the top level of the directory
        #[arg(long)]
        no_recursive: bool,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
