//! Stack-machine parser for Apex debug logs.
//!
//! Each enter event opens a node on top of the stack; each exit event closes
//! the top node, stamps its end time and duration, and attaches it to the
//! node below. Nodes still open at end of input are folded into their
//! parents without timing, so truncated logs still yield a complete tree.

use super::extractors::{
    extract_count, extract_line_number, extract_object, extract_rows, extract_value,
};
use super::line::{EventType, LogLine};
use super::schema::{GovernorLimit, GovernorLimits, LogMeta, NodeKind, ParsedLog, TreeNode};
use crate::utils::config::round3;
use crate::utils::error::ParseError;
use log::{debug, trace};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Per-source parsing state.
///
/// Create one parser per input. `parse_*` methods reset the state first, so
/// an instance may be reused sequentially but never shared between parses.
#[derive(Debug)]
pub struct ApexLogParser {
    /// Open nodes; index 0 is the root and is never popped
    stack: Vec<TreeNode>,
    limits: GovernorLimits,
    user: Option<String>,
    /// Start of the first top-level node
    start_time: Option<f64>,
    /// End of the most recently closed top-level node
    end_time: Option<f64>,
    lines_seen: usize,
}

impl Default for ApexLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ApexLogParser {
    pub fn new() -> Self {
        Self {
            stack: vec![TreeNode::root()],
            limits: GovernorLimits::new(),
            user: None,
            start_time: None,
            end_time: None,
            lines_seen: 0,
        }
    }

    /// Discard all state from a previous parse
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Parse a log file from disk, streaming it line by line
    ///
    /// # Errors
    /// * `ParseError::InvalidArgument` - empty path
    /// * `ParseError::NotFound` - path does not reference an existing file
    /// * `ParseError::Io` - the file could not be opened or read
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<ParsedLog, ParseError> {
        let path = path.as_ref();

        if path.as_os_str().is_empty() {
            return Err(ParseError::InvalidArgument(
                "File path is required".to_string(),
            ));
        }
        if !path.is_file() {
            return Err(ParseError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!("Parsing log file: {}", path.display());

        self.parse_reader(filename, BufReader::new(file))
            .map_err(|source| ParseError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Parse any buffered byte stream. Only one line is held in memory at a time.
    pub fn parse_reader<R: BufRead>(
        &mut self,
        filename: impl Into<String>,
        mut reader: R,
    ) -> std::io::Result<ParsedLog> {
        self.reset();

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            self.feed_line(line.trim());
        }

        Ok(self.finish(filename.into()))
    }

    /// Parse log text already in memory
    pub fn parse_str(&mut self, filename: impl Into<String>, text: &str) -> ParsedLog {
        self.reset();
        for line in text.lines() {
            self.feed_line(line.trim());
        }
        self.finish(filename.into())
    }

    /// Apply one trimmed line to the state machine
    pub fn feed_line(&mut self, line: &str) {
        self.lines_seen += 1;

        let Some(log_line) = LogLine::split(line) else {
            return;
        };
        let Some(event) = log_line.event_type() else {
            trace!("Ignoring unmodelled event {}", log_line.tag);
            return;
        };

        let ts = log_line.timestamp;
        match event {
            EventType::UserInfo => self.handle_user_info(&log_line),
            EventType::CodeUnitStarted => {
                let name = log_line.last().to_string();
                self.push_node(NodeKind::CodeUnit { name }, ts);
            }
            EventType::MethodEntry => {
                let kind = NodeKind::Method {
                    line_number: extract_line_number(log_line.first()),
                    method: log_line.last().to_string(),
                };
                self.push_node(kind, ts);
            }
            EventType::SoqlExecuteBegin => {
                let query = log_line.last().to_string();
                let object = extract_object(&query);
                let kind = NodeKind::Soql {
                    query,
                    object,
                    rows: None,
                };
                self.push_node(kind, ts);
            }
            EventType::DmlBegin => {
                // DML_BEGIN|[line]|Op:<operation>|Type:<object>|Rows:<n>
                let kind = NodeKind::Dml {
                    line_number: extract_line_number(log_line.first()),
                    operation: log_line.from_end(3).map(extract_value).unwrap_or_default(),
                    object: log_line.from_end(2).map(extract_value).unwrap_or_default(),
                    rows: extract_rows(log_line.last()),
                };
                self.push_node(kind, ts);
            }
            EventType::SoqlExecuteEnd => self.handle_soql_exit(&log_line),
            EventType::CodeUnitFinished | EventType::MethodExit | EventType::DmlEnd => {
                self.pop_node(ts)
            }
            EventType::LimitUsage => self.handle_limit_usage(&log_line),
            EventType::ExceptionThrown => self.handle_exception(&log_line),
        }
    }

    /// Number of nodes currently open, excluding the root
    pub fn open_depth(&self) -> usize {
        self.stack.len() - 1
    }

    fn handle_user_info(&mut self, line: &LogLine<'_>) {
        if let Some(user) = line.from_end(3) {
            self.user = Some(user.to_string());
        }
    }

    fn handle_soql_exit(&mut self, line: &LogLine<'_>) {
        if let Some(TreeNode {
            kind: NodeKind::Soql { rows, .. },
            ..
        }) = self.stack.last_mut()
        {
            *rows = Some(extract_rows(line.last()));
        }
        self.pop_node(line.timestamp);
    }

    /// `LIMIT_USAGE|[line]|<name>|<used>|<max>`
    fn handle_limit_usage(&mut self, line: &LogLine<'_>) {
        let (Some(name), Some(used), Some(max)) =
            (line.from_end(3), line.from_end(2), line.from_end(1))
        else {
            return;
        };

        self.limits.insert(
            name.to_string(),
            GovernorLimit {
                used: extract_count(used),
                max: extract_count(max),
            },
        );
    }

    /// `EXCEPTION_THROWN|[line]|<message>`; the message may contain `|`
    fn handle_exception(&mut self, line: &LogLine<'_>) {
        let message = if line.data.len() > 1 {
            line.join_from(1)
        } else {
            line.last().to_string()
        };
        let node = TreeNode::open(NodeKind::Exception { message }, line.timestamp);
        self.current_mut().children.push(node);
    }

    fn current_mut(&mut self) -> &mut TreeNode {
        // The root is never popped, so the stack is never empty
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    fn push_node(&mut self, kind: NodeKind, time_start: f64) {
        if self.stack.len() == 1 {
            self.start_time.get_or_insert(time_start);
        }
        self.stack.push(TreeNode::open(kind, time_start));
    }

    fn pop_node(&mut self, time_end: f64) {
        if self.stack.len() <= 1 {
            debug!(
                "Dropping exit event at line {} with no open node",
                self.lines_seen
            );
            return;
        }

        if let Some(mut node) = self.stack.pop() {
            let time_start = node.time_start.unwrap_or_default();
            node.time_end = Some(time_end);
            node.duration = Some(round3(time_end - time_start));
            self.current_mut().children.push(node);
        }
        if self.stack.len() == 1 {
            self.end_time = Some(time_end);
        }
    }

    /// Fold unclosed nodes into their parents and assemble the result
    fn finish(&mut self, filename: String) -> ParsedLog {
        if self.open_depth() > 0 {
            debug!("{} node(s) still open at end of input", self.open_depth());
        }
        while self.stack.len() > 1 {
            if let Some(node) = self.stack.pop() {
                self.current_mut().children.push(node);
            }
        }

        let duration_ms = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => round3(end - start),
            _ => 0.0,
        };

        let state = std::mem::take(self);
        let tree = state
            .stack
            .into_iter()
            .next()
            .unwrap_or_else(TreeNode::root);

        debug!(
            "Parsed {} lines from {} ({} top-level nodes)",
            state.lines_seen,
            filename,
            tree.children.len()
        );

        ParsedLog {
            meta: LogMeta {
                filename,
                duration_ms,
            },
            user: state.user,
            limits: state.limits,
            tree,
        }
    }
}

/// Parse one log file with a fresh parser
pub fn parse_log_file(path: impl AsRef<Path>) -> Result<ParsedLog, ParseError> {
    ApexLogParser::new().parse_file(path)
}
