//! Parse command implementation.
//!
//! The parse command:
//! 1. Validates the input paths
//! 2. Parses one log, or several logs in parallel
//! 3. Prints or writes the JSON result
//! 4. Optionally prints a trace summary per log

use crate::aggregator::{parse_batch, summarize, BatchResult, TraceSummary};
use crate::output::{to_json_string, write_batch_result, write_parsed_log};
use crate::parser::{parse_log_file, ParsedLog};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the parse command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ParseArgs {
    /// Log files to parse
    pub files: Vec<PathBuf>,

    /// Write JSON here instead of stdout
    pub output: Option<PathBuf>,

    /// Print a trace summary after parsing
    pub print_summary: bool,

    /// Number of slowest nodes listed in the summary
    pub top_nodes: usize,

    /// Worker threads for batch mode (None = one per core)
    pub jobs: Option<usize>,
}

impl Default for ParseArgs {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            output: None,
            print_summary: false,
            top_nodes: 10,
            jobs: None,
        }
    }
}

/// What a parse run produced
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Single(ParsedLog),
    Batch(BatchResult),
    /// The only input failed to parse
    Failed,
}

impl ParseOutcome {
    /// True when any source failed
    pub fn has_errors(&self) -> bool {
        match self {
            ParseOutcome::Single(_) => false,
            ParseOutcome::Batch(result) => result.has_errors,
            ParseOutcome::Failed => true,
        }
    }
}

/// Validate parse arguments
///
/// **Public** - can be called before execute_parse for early validation
pub fn validate_args(args: &ParseArgs) -> Result<()> {
    if args.files.is_empty() {
        anyhow::bail!("At least one log file is required");
    }

    if args.files.iter().any(|f| f.as_os_str().is_empty()) {
        anyhow::bail!("Log file paths cannot be empty");
    }

    if args.jobs == Some(0) {
        anyhow::bail!("jobs must be greater than 0");
    }

    if args.top_nodes > 1000 {
        anyhow::bail!("top is too large (max 1000)");
    }

    Ok(())
}

/// Execute the parse command
///
/// **Public** - main entry point called from main.rs
///
/// A single unreadable input is reported as a warning, not an `Err`; the
/// caller turns [`ParseOutcome::has_errors`] into the exit status. `Err` is
/// reserved for problems with the run itself (bad output path, pool setup).
pub fn execute_parse(args: ParseArgs) -> Result<ParseOutcome> {
    let start_time = Instant::now();

    let outcome = if let [file] = args.files.as_slice() {
        info!("Parsing {}", file.display());
        match parse_log_file(file) {
            Ok(log) => {
                emit(&log, args.output.as_ref(), |log, path| write_parsed_log(log, path))?;
                if args.print_summary {
                    print_summary(&log.meta.filename, &summarize(&log, args.top_nodes));
                }
                ParseOutcome::Single(log)
            }
            Err(e) => {
                warn!("Error parsing {}: {}", file.display(), e);
                ParseOutcome::Failed
            }
        }
    } else {
        info!("Parsing {} files", args.files.len());
        let result = parse_batch(&args.files, args.jobs).context("Failed to start batch parse")?;

        debug!(
            "Batch finished: {} parsed, {} failed",
            result.logs.len(),
            result.warnings.len()
        );

        emit(&result, args.output.as_ref(), |r, path| write_batch_result(r, path))?;
        if args.print_summary {
            for sourced in &result.logs {
                print_summary(&sourced.source, &summarize(&sourced.log, args.top_nodes));
            }
        }
        ParseOutcome::Batch(result)
    };

    let elapsed = start_time.elapsed();
    info!("Parse completed in {:.2}s", elapsed.as_secs_f64());

    Ok(outcome)
}

/// Write to `output` when given, otherwise print JSON to stdout
fn emit<T, W>(value: &T, output: Option<&PathBuf>, write: W) -> Result<()>
where
    T: serde::Serialize,
    W: FnOnce(&T, &PathBuf) -> Result<(), crate::utils::OutputError>,
{
    match output {
        Some(path) => {
            write(value, path).context("Failed to write JSON output")?;
            info!("✓ Result written to: {}", path.display());
        }
        None => println!("{}", to_json_string(value)?),
    }
    Ok(())
}

fn print_summary(source: &str, summary: &TraceSummary) {
    eprintln!("\n{}", "=".repeat(80));
    eprintln!("TRACE SUMMARY: {}", source);
    eprintln!("{}", "=".repeat(80));
    eprintln!("Nodes:        {}", summary.total_nodes());
    for (kind, count) in &summary.node_counts {
        eprintln!("  {:<12}{}", kind, count);
    }
    eprintln!("Max depth:    {}", summary.max_depth);
    eprintln!("SOQL rows:    {}", summary.soql_rows);
    eprintln!("DML rows:     {}", summary.dml_rows);
    eprintln!("Unclosed:     {}", summary.unclosed_nodes);
    if !summary.slowest.is_empty() {
        eprintln!("\nSlowest nodes:");
        for (i, node) in summary.slowest.iter().enumerate() {
            eprintln!(
                "  {:>2}. {:>10.3} ms  {:<10} {}",
                i + 1,
                node.duration,
                node.kind,
                node.name
            );
        }
    }
    eprintln!("{}", "=".repeat(80));
}
