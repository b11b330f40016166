//! Error types for plpgsql-deparser

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding, hydrating or rendering a procedural tree
#[derive(Error, Debug)]
pub enum DeparseError {
    #[error("Failed to read parse tree file: {path}")]
    ParseTreeReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid procedural parse tree at line {line}, column {column}: {message}")]
    InvalidParseTree {
        line: usize,
        column: usize,
        message: String,
    },

    /// The tree carries a node tag this crate does not model. This signals a
    /// version mismatch with the procedural parser and is never skipped.
    #[error("Unrecognized node tag `{tag}` in procedural parse tree")]
    UnknownNodeTag { tag: String },

    #[error("Failed to serialize parse tree: {message}")]
    SerializeError { message: String },

    #[error("Hydration aborted at {path}: {message}")]
    HydrationAborted { path: String, message: String },
}

/// Failures reported by the plain-SQL parser/renderer collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("SQL parse error: {message}")]
    Parse { message: String },

    #[error("Unexpected parse shape: expected {expected}")]
    UnexpectedShape { expected: String },

    #[error("SQL render error: {message}")]
    Render { message: String },
}

impl From<sqlparser::parser::ParserError> for BackendError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        BackendError::Parse {
            message: err.to_string(),
        }
    }
}

/// Why an assignment leaf could not be split into target and value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentSplitError {
    #[error("no top-level assignment operator")]
    NoOperator,

    #[error("ambiguous assignment: {count} top-level `=` operators")]
    Ambiguous { count: usize },

    #[error("assignment has an empty {side}")]
    EmptySide { side: &'static str },
}
