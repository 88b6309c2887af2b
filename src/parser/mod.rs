//! Log parsing and schema definitions.
//!
//! This module handles:
//! - Extracting typed values from raw log fields
//! - Classifying lines by event tag
//! - Building the execution tree with a stack machine
//! - Defining the output schema

pub mod apex_log;
pub mod extractors;
pub mod line;
pub mod schema;

// Re-export main types
pub use apex_log::{parse_log_file, ApexLogParser};
pub use line::{EventType, LogLine};
pub use schema::{GovernorLimit, GovernorLimits, LogMeta, NodeKind, ParsedLog, TreeNode};
