//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while parsing `.su` records or a call listing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed stack usage line {line_no}: {line:?}")]
    MalformedUsageLine { line_no: usize, line: String },

    #[error("Malformed call listing line {line_no}: {line:?}")]
    MalformedCallLine { line_no: usize, line: String },

    #[error("Call listing is empty, no entry point to anchor on")]
    EmptyListing,

    #[error("Inconsistent indentation at call listing line {line_no} ({reason}): {line:?}")]
    InconsistentIndent {
        line_no: usize,
        line: String,
        reason: String,
    },
}

/// Errors that can occur during worst-case stack estimation
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EstimateError {
    #[error("Recursion detected: {}", .cycle.join(" -> "))]
    RecursionDetected { cycle: Vec<String> },

    #[error("Function not present in the call graph: {0}")]
    UnknownFunction(String),
}

/// Errors raised by the external tools and files the analysis consumes
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Unreadable output from {program}: {reason}")]
    InvalidOutput { program: String, reason: String },

    #[error("No stack usage file matching {pattern:?} in {}", .dir.display())]
    NoInputFound { dir: PathBuf, pattern: String },

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read file: {0}")]
    ReadFailed(std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursion_message_names_cycle() {
        let err = EstimateError::RecursionDetected {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "Recursion detected: a -> b -> a");
    }

    #[test]
    fn test_read_failure_message() {
        let err = OutputError::ReadFailed(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("Failed to read file:"));
    }

    #[test]
    fn test_malformed_line_message_includes_line() {
        let err = ParseError::MalformedUsageLine {
            line_no: 3,
            line: "garbage".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("garbage"));
    }
}
