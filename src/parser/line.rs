//! Line classification.
//!
//! A log line looks like `timing|EVENT_TYPE|data|data|...`. Lines with fewer
//! than three fields and lines whose tag is unknown carry no event.

use super::extractors::extract_timestamp;
use crate::utils::config::{FIELD_DELIMITER, MIN_LINE_FIELDS};

/// Event tags the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    UserInfo,
    CodeUnitStarted,
    CodeUnitFinished,
    MethodEntry,
    MethodExit,
    SoqlExecuteBegin,
    SoqlExecuteEnd,
    DmlBegin,
    DmlEnd,
    LimitUsage,
    ExceptionThrown,
}

impl EventType {
    /// Map a raw tag to an event type, `None` for tags we do not model
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "USER_INFO" => Self::UserInfo,
            "CODE_UNIT_STARTED" => Self::CodeUnitStarted,
            "CODE_UNIT_FINISHED" => Self::CodeUnitFinished,
            "METHOD_ENTRY" => Self::MethodEntry,
            "METHOD_EXIT" => Self::MethodExit,
            "SOQL_EXECUTE_BEGIN" => Self::SoqlExecuteBegin,
            "SOQL_EXECUTE_END" => Self::SoqlExecuteEnd,
            "DML_BEGIN" => Self::DmlBegin,
            "DML_END" => Self::DmlEnd,
            "LIMIT_USAGE" => Self::LimitUsage,
            "EXCEPTION_THROWN" => Self::ExceptionThrown,
            _ => return None,
        })
    }
}

/// One classified log line, borrowing from the raw text
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine<'a> {
    /// Milliseconds from the timing field (0 when absent)
    pub timestamp: f64,

    /// Raw event tag
    pub tag: &'a str,

    /// Data fields after the tag, never empty
    pub data: Vec<&'a str>,
}

impl<'a> LogLine<'a> {
    /// Split a trimmed line into timing, tag and data fields
    pub fn split(line: &'a str) -> Option<Self> {
        let mut parts = line.split(FIELD_DELIMITER);
        let timing = parts.next()?;
        let tag = parts.next()?;
        let data: Vec<&str> = parts.collect();

        if data.len() < MIN_LINE_FIELDS - 2 {
            return None;
        }

        Some(Self {
            timestamp: extract_timestamp(timing),
            tag,
            data,
        })
    }

    pub fn event_type(&self) -> Option<EventType> {
        EventType::from_tag(self.tag)
    }

    /// First data field
    pub fn first(&self) -> &'a str {
        self.data.first().copied().unwrap_or_default()
    }

    /// Last data field
    pub fn last(&self) -> &'a str {
        self.from_end(1).unwrap_or_default()
    }

    /// The `n`th field counted from the end (1 = last)
    pub fn from_end(&self, n: usize) -> Option<&'a str> {
        let index = self.data.len().checked_sub(n)?;
        self.data.get(index).copied()
    }

    /// Data fields from `start` onward, re-joined with the field delimiter.
    /// Free-text payloads may themselves contain the delimiter.
    pub fn join_from(&self, start: usize) -> String {
        self.data
            .get(start..)
            .unwrap_or_default()
            .join(FIELD_DELIMITER.to_string().as_str())
    }
}
