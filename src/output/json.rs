//! JSON output writer.
//!
//! Writes parsed logs and batch results to JSON files with pretty formatting.

use crate::aggregator::BatchResult;
use crate::parser::ParsedLog;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a parsed log to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_parsed_log(log: &ParsedLog, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_json(log, output_path.as_ref())
}

/// Write a merged batch result to a JSON file
pub fn write_batch_result(
    result: &BatchResult,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_json(result, output_path.as_ref())
}

/// Pretty JSON string for printing to stdout
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, OutputError> {
    let mut buf = Vec::new();
    serialize_pretty(value, &mut buf)?;
    String::from_utf8(buf).map_err(|e| {
        OutputError::WriteFailed(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Pretty-print `value` into `writer`, growing the stack for deep trees
fn serialize_pretty<T: Serialize, W: std::io::Write>(
    value: &T,
    writer: W,
) -> Result<(), OutputError> {
    let mut ser = serde_json::Serializer::pretty(writer);
    value
        .serialize(serde_stacker::Serializer::new(&mut ser))
        .map_err(OutputError::SerializationFailed)
}

fn write_json<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    info!("Writing JSON to: {}", output_path.display());

    validate_output_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serialize_pretty(value, &mut writer)?;
    std::io::Write::flush(&mut writer)?;

    info!(
        "JSON written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a parsed log back from a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - File open error (reusing WriteFailed for I/O)
/// * `OutputError::ParseFailed` - Malformed JSON or unexpected shape
pub fn read_parsed_log(input_path: impl AsRef<Path>) -> Result<ParsedLog, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading parsed log from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    // Trees are as deep as the call stack that produced them
    let mut de = serde_json::Deserializer::from_reader(BufReader::new(file));
    de.disable_recursion_limit();
    let log = ParsedLog::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(OutputError::ParseFailed)?;
    de.end().map_err(OutputError::ParseFailed)?;

    debug!(
        "Parsed log loaded: {} ({} top-level nodes)",
        log.meta.filename,
        log.tree.children.len()
    );

    Ok(log)
}
