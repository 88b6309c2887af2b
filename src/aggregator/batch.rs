//! Batch parsing of several log sources.
//!
//! Each source gets its own parser, so parses share no state and can run on
//! a rayon pool. A source that fails to open is reported as a warning and
//! never affects the others.

use crate::parser::{parse_log_file, ParsedLog};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A parsed log tagged with the source it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedLog {
    pub source: String,

    #[serde(flatten)]
    pub log: ParsedLog,
}

/// A source that could not be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceWarning {
    pub source: String,
    pub message: String,
}

/// Merged result of a batch parse
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    /// Successful parses, in input order
    pub logs: Vec<SourcedLog>,

    pub warnings: Vec<SourceWarning>,

    /// True when at least one source failed
    #[serde(rename = "hasErrors")]
    pub has_errors: bool,
}

impl BatchResult {
    /// Record the outcome of one source
    pub fn push(&mut self, source: String, outcome: Result<ParsedLog, String>) {
        match outcome {
            Ok(log) => self.logs.push(SourcedLog { source, log }),
            Err(message) => {
                warn!("Error parsing {}: {}", source, message);
                self.has_errors = true;
                self.warnings.push(SourceWarning { source, message });
            }
        }
    }
}

/// Parse every path independently and merge the results.
///
/// `jobs` bounds the number of worker threads; `None` uses rayon's default.
///
/// # Errors
/// Only fails if the worker pool itself cannot be built. Per-source
/// failures are collected in the result.
pub fn parse_batch<P>(
    paths: &[P],
    jobs: Option<usize>,
) -> Result<BatchResult, rayon::ThreadPoolBuildError>
where
    P: AsRef<Path> + Sync,
{
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build()?;

    debug!("Parsing {} sources on {} threads", paths.len(), pool.current_num_threads());

    let outcomes: Vec<(String, Result<ParsedLog, String>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                let outcome = parse_log_file(path).map_err(|e| e.to_string());
                (path.display().to_string(), outcome)
            })
            .collect()
    });

    let mut result = BatchResult::default();
    for (source, outcome) in outcomes {
        result.push(source, outcome);
    }

    Ok(result)
}
