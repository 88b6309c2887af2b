//! Apex Log Trace CLI
//!
//! Parses Apex debug logs into timed execution trees and prints or writes
//! them as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use apex_log_trace::commands::{
    display_schema, display_version, execute_parse, validate_args, validate_log_file, ParseArgs,
};
use apex_log_trace::utils::config::{JOBS_ENV, OUTPUT_ENV};

/// Apex Log Trace - execution trees from Apex debug logs
#[derive(Parser, Debug)]
#[command(name = "apex-log-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse one or more log files
    Parse {
        /// Log files to parse (several files produce a merged batch result)
        #[arg(short, long, required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Write JSON to this path instead of stdout
        #[arg(short, long, env = OUTPUT_ENV)]
        output: Option<PathBuf>,

        /// Print a trace summary to stderr
        #[arg(long)]
        summary: bool,

        /// Number of slowest nodes to list in the summary
        #[arg(long, default_value = "10")]
        top: usize,

        /// Worker threads for batch parsing
        #[arg(short, long, env = JOBS_ENV)]
        jobs: Option<usize>,
    },

    /// Validate a parsed-log JSON file
    Validate {
        /// Path to parsed-log JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Parse {
            files,
            output,
            summary,
            top,
            jobs,
        } => {
            let args = ParseArgs {
                files,
                output,
                print_summary: summary,
                top_nodes: top,
                jobs,
            };

            validate_args(&args)?;

            if execute_parse(args)?.has_errors() {
                std::process::exit(1);
            }
        }

        Commands::Validate { file } => {
            validate_log_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
