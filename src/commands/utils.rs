use crate::output::read_parsed_log;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a parsed-log JSON file
pub fn validate_log_file(file_path: PathBuf) -> Result<()> {
    println!("Validating parsed log: {}", file_path.display());

    let log = read_parsed_log(&file_path)
        .with_context(|| format!("{} is not a valid parsed log", file_path.display()))?;

    println!("✓ Valid parsed log JSON");
    println!("  File: {}", log.meta.filename);
    println!("  Duration: {} ms", log.meta.duration_ms);
    println!("  User: {}", log.user.as_deref().unwrap_or("-"));
    println!("  Limits: {}", log.limits.len());
    println!("  Top-level nodes: {}", log.tree.children.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Apex Log Trace Output Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  meta: object                 - Source metadata");
        println!("    filename: string           - Basename of the log file");
        println!("    durationMs: number         - First top-level start to last top-level end");
        println!("  user: string?                - Session user");
        println!("  limits: object               - Governor limits by name");
        println!("    <name>: {{used, max}}        - Usage and maximum");
        println!("  tree: object                 - Root node");
        println!("    type: string               - ROOT | CODE UNIT | METHOD | SOQL | DML | EXCEPTION");
        println!("    timeStart: number?         - Start in ms");
        println!("    timeEnd: number?           - End in ms (closed nodes)");
        println!("    duration: number?          - timeEnd - timeStart (closed nodes)");
        println!("    children: array?           - Nested nodes in start order");
        println!();
        println!("Batch Structure (several files):");
        println!("  logs: array                  - Parsed logs, each with a 'source' field");
        println!("  warnings: array              - {{source, message}} for failed files");
        println!("  hasErrors: boolean           - True if any file failed");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Apex Log Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Output Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Turns Apex debug logs into timed execution trees.");
}
