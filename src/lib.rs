//! Apex Log Trace
//!
//! Streaming parser that converts pipe-delimited Apex debug logs into a
//! hierarchical execution tree with per-node timing, plus the session user
//! and governor-limit usage.
//!
//! ## Getting Started
//!
//! ```no_run
//! use apex_log_trace::parser::ApexLogParser;
//!
//! let log = ApexLogParser::new().parse_file("apex.log")?;
//! println!("{} top-level nodes", log.tree.children.len());
//! # Ok::<(), apex_log_trace::utils::ParseError>(())
//! ```
//!
//! The `apex-log-trace` binary wraps this with batch parsing and JSON output.

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
