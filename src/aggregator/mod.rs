//! Aggregation over parsed logs.
//!
//! This module provides:
//! - Batch parsing of many sources into one merged result
//! - Summary metrics (node counts, row totals, slowest nodes)

pub mod batch;
pub mod metrics;

// Re-export main types and functions
pub use batch::{parse_batch, BatchResult, SourceWarning, SourcedLog};
pub use metrics::{summarize, SlowNode, TraceSummary};
