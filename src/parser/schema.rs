//! Output schema definitions for parsed logs.
//!
//! This module defines the structure handed back to callers and written as
//! JSON. Field names are camelCase to match the established output format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind-specific payload of a tree node.
///
/// Serialized inline with the node under a `type` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    #[serde(rename = "ROOT")]
    Root,

    #[serde(rename = "CODE UNIT")]
    CodeUnit {
        /// Entry-point descriptor (trigger, anonymous block, ...)
        name: String,
    },

    #[serde(rename = "METHOD")]
    Method {
        #[serde(rename = "lineNumber")]
        line_number: u32,
        method: String,
    },

    #[serde(rename = "SOQL")]
    Soql {
        query: String,
        object: String,
        /// Only known once the query's end event arrives
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<u64>,
    },

    #[serde(rename = "DML")]
    Dml {
        #[serde(rename = "lineNumber")]
        line_number: u32,
        operation: String,
        object: String,
        rows: u64,
    },

    #[serde(rename = "EXCEPTION")]
    Exception { message: String },
}

impl NodeKind {
    /// Short label used in summaries and log messages
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "ROOT",
            NodeKind::CodeUnit { .. } => "CODE UNIT",
            NodeKind::Method { .. } => "METHOD",
            NodeKind::Soql { .. } => "SOQL",
            NodeKind::Dml { .. } => "DML",
            NodeKind::Exception { .. } => "EXCEPTION",
        }
    }
}

/// A node of the execution tree.
///
/// `duration` is set exactly when the node was closed by a matching exit
/// event. The root is never closed and carries no timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub kind: NodeKind,

    #[serde(rename = "timeStart", default, skip_serializing_if = "Option::is_none")]
    pub time_start: Option<f64>,

    #[serde(rename = "timeEnd", default, skip_serializing_if = "Option::is_none")]
    pub time_end: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Children in the order they started
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create the root of a new tree
    pub fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            time_start: None,
            time_end: None,
            duration: None,
            children: Vec::new(),
        }
    }

    /// Create a node opened at `time_start`
    pub fn open(kind: NodeKind, time_start: f64) -> Self {
        Self {
            kind,
            time_start: Some(time_start),
            time_end: None,
            duration: None,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    /// Human-readable identifier of the node (name, method, query, ...)
    pub fn display_name(&self) -> String {
        match &self.kind {
            NodeKind::Root => "ROOT".to_string(),
            NodeKind::CodeUnit { name } => name.clone(),
            NodeKind::Method { method, .. } => method.clone(),
            NodeKind::Soql { query, .. } => query.clone(),
            NodeKind::Dml {
                operation, object, ..
            } => format!("{} {}", operation, object),
            NodeKind::Exception { message } => message.clone(),
        }
    }
}

impl Drop for TreeNode {
    // Unclosed enters can nest thousands deep; the default drop glue would
    // recurse once per level
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Used/maximum pair for one governor limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorLimit {
    pub used: u64,
    pub max: u64,
}

/// Governor limits keyed by limit name (e.g. "SOQL")
pub type GovernorLimits = BTreeMap<String, GovernorLimit>;

/// Metadata about the parsed source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMeta {
    /// Basename of the input
    pub filename: String,

    /// From the first top-level start to the last top-level end, 0 if none closed
    #[serde(rename = "durationMs")]
    pub duration_ms: f64,
}

/// Complete result of parsing one log source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLog {
    pub meta: LogMeta,

    /// Username from the session's user-info event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default)]
    pub limits: GovernorLimits,

    /// Root node owning the whole execution tree
    pub tree: TreeNode,
}
