//! Summary metrics over a parsed execution tree.
//!
//! The slowest closed nodes are the primary targets when a transaction
//! runs long, so they are ranked alongside the per-kind counts.

use crate::parser::{NodeKind, ParsedLog, TreeNode};
use log::debug;
use std::collections::BTreeMap;

/// One of the slowest nodes in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct SlowNode {
    /// Node kind label, e.g. "METHOD"
    pub kind: String,

    /// Name, method signature or query text
    pub name: String,

    pub duration: f64,

    /// Nesting depth below the root (1 = top level)
    pub depth: usize,
}

/// Aggregate statistics for one parsed log
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceSummary {
    /// Number of nodes per kind label
    pub node_counts: BTreeMap<String, u64>,

    /// Rows returned by all SOQL queries that completed
    pub soql_rows: u64,

    /// Rows touched by all DML operations
    pub dml_rows: u64,

    /// Deepest nesting below the root
    pub max_depth: usize,

    /// Nodes that never received an exit event
    pub unclosed_nodes: u64,

    /// Slowest closed nodes, descending by duration
    pub slowest: Vec<SlowNode>,
}

impl TraceSummary {
    /// Total number of non-root nodes
    pub fn total_nodes(&self) -> u64 {
        self.node_counts.values().sum()
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "{} nodes, depth {}, {} SOQL rows, {} DML rows, {} unclosed",
            self.total_nodes(),
            self.max_depth,
            self.soql_rows,
            self.dml_rows,
            self.unclosed_nodes
        )
    }
}

/// Walk the tree of `log` and collect summary statistics
///
/// # Arguments
/// * `log` - Parsed log to summarize
/// * `top_n` - Number of slowest nodes to keep
pub fn summarize(log: &ParsedLog, top_n: usize) -> TraceSummary {
    let mut summary = TraceSummary::default();
    let mut closed: Vec<SlowNode> = Vec::new();

    // Explicit stack keeps deep traces off the call stack
    let mut pending: Vec<(&TreeNode, usize)> = log.tree.children.iter().map(|c| (c, 1)).collect();
    while let Some((node, depth)) = pending.pop() {
        visit(node, depth, &mut summary, &mut closed);
        pending.extend(node.children.iter().map(|c| (c, depth + 1)));
    }

    closed.sort_by(|a, b| b.duration.total_cmp(&a.duration));
    closed.truncate(top_n);
    summary.slowest = closed;

    debug!("Trace summary for {}: {}", log.meta.filename, summary.summary());

    summary
}

fn visit(node: &TreeNode, depth: usize, summary: &mut TraceSummary, closed: &mut Vec<SlowNode>) {
    *summary
        .node_counts
        .entry(node.kind.label().to_string())
        .or_insert(0) += 1;
    summary.max_depth = summary.max_depth.max(depth);

    match &node.kind {
        NodeKind::Soql { rows: Some(rows), .. } => summary.soql_rows += rows,
        NodeKind::Dml { rows, .. } => summary.dml_rows += rows,
        _ => {}
    }

    match node.duration {
        Some(duration) => closed.push(SlowNode {
            kind: node.kind.label().to_string(),
            name: node.display_name(),
            duration,
            depth,
        }),
        // Exceptions are point events and never close
        None if !matches!(node.kind, NodeKind::Exception { .. }) => summary.unclosed_nodes += 1,
        None => {}
    }
}
