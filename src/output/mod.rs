//! Output writers for parsed logs.
//!
//! Results are written as pretty JSON, either to a file or to stdout.

pub mod json;

// Re-export main functions
pub use json::{read_parsed_log, to_json_string, write_batch_result, write_parsed_log};
