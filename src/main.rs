//! Stack Estimate CLI
//!
//! Estimates the worst-case stack usage of an embedded firmware image from
//! GCC stack usage records and a cflow call listing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use stack_estimate::commands::{
    display_version, execute_analyze, validate_args, validate_report_file, AnalyzeArgs,
};
use stack_estimate::utils::config::{DEFAULT_CFLOW_PROGRAM, DEFAULT_SU_DIR, DEFAULT_SU_PATTERN};

/// Stack Estimate - worst-case stack depth for embedded firmware
#[derive(Parser, Debug)]
#[command(name = "stack-estimate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and print the annotated call tree
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate worst-case stack usage
    Analyze {
        /// C sources passed to the call listing generator
        sources: Vec<PathBuf>,

        /// Directory searched for the newest stack usage file
        #[arg(long, env = "STACK_ESTIMATE_SU_DIR", default_value = DEFAULT_SU_DIR)]
        su_dir: PathBuf,

        /// File-name glob for stack usage files
        #[arg(long, env = "STACK_ESTIMATE_SU_PATTERN", default_value = DEFAULT_SU_PATTERN)]
        su_pattern: String,

        /// Use this stack usage file instead of searching
        #[arg(long)]
        su_file: Option<PathBuf>,

        /// Use a pre-generated call listing instead of running the generator
        #[arg(long)]
        listing: Option<PathBuf>,

        /// Call listing generator program
        #[arg(long, env = "STACK_ESTIMATE_CFLOW", default_value = DEFAULT_CFLOW_PROGRAM)]
        cflow: String,

        /// Makefile fragment to evaluate --extra-source in
        #[arg(long, requires = "extra_source")]
        env_mk: Option<PathBuf>,

        /// Make expression naming one more source file (e.g. '$(HAL)/hal.c')
        #[arg(long, requires = "env_mk")]
        extra_source: Option<String>,

        /// Fail if the estimate exceeds this many bytes
        #[arg(long)]
        budget: Option<u64>,

        /// Output path for JSON report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of heaviest frames to include in the report
        #[arg(long, default_value = "10")]
        top_frames: usize,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            sources,
            su_dir,
            su_pattern,
            su_file,
            listing,
            cflow,
            env_mk,
            extra_source,
            budget,
            output,
            top_frames,
        } => {
            let args = AnalyzeArgs {
                sources,
                su_dir,
                su_pattern,
                su_file,
                listing,
                cflow_program: cflow,
                env_mk,
                extra_source,
                budget,
                output_json: output,
                top_frames,
                verbose: cli.verbose,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
