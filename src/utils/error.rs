//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a log source from being parsed at all.
///
/// Problems inside individual lines are never reported here; the parser
/// skips them and keeps building the tree.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseFailed(serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
