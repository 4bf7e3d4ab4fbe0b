//! CLI error types with miette diagnostics
//!
//! Core analysis errors are wrapped as-is; everything about files, JSON and
//! arguments is reported here with enough context to fix the input.

use miette::{Diagnostic, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific error types with enhanced diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Failed to {operation} '{}'", path.display())]
    #[diagnostic(
        code(dagsched::cli::file_error),
        help("Check file permissions and ensure the path exists")
    )]
    FileError {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid task file '{}': {message}", path.display())]
    #[diagnostic(
        code(dagsched::cli::parse_error),
        help("Expected a JSON array of task objects with id, name, duration and dependencies")
    )]
    ParseError {
        path: PathBuf,
        message: String,
        #[source_code]
        src: String,
        #[label("error occurred here")]
        error_span: SourceSpan,
    },

    #[error("No tasks found in '{}'", path.display())]
    #[diagnostic(
        code(dagsched::cli::empty_task_file),
        help("Run 'dagsched sample <FILE>' to create an example task file")
    )]
    EmptyTaskFile { path: PathBuf },

    #[error("Task graph analysis failed")]
    #[diagnostic(code(dagsched::cli::analysis_failed))]
    Analysis(#[from] dagsched_task_graph::Error),

    #[error("Invalid value for {argument}: {reason}")]
    #[diagnostic(
        code(dagsched::cli::invalid_argument),
        help("Run 'dagsched --help' to see available options")
    )]
    InvalidArgument { argument: String, reason: String },

    #[error("Failed to serialize {what}")]
    #[diagnostic(code(dagsched::cli::serialize_error))]
    SerializeError {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CliError {
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileError {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Build a parse error pointing at the serde error location in `src`.
    pub fn parse_error(path: impl Into<PathBuf>, src: impl Into<String>, error: &serde_json::Error) -> Self {
        let src = src.into();
        let offset = line_column_offset(&src, error.line(), error.column());
        Self::ParseError {
            path: path.into(),
            message: error.to_string(),
            src,
            error_span: SourceSpan::from((offset, 0)),
        }
    }

    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn serialize_error(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::SerializeError {
            what: what.into(),
            source,
        }
    }
}

/// Byte offset of a 1-based line and column, clamped to the source length.
///
/// serde_json reports line 0 for errors without a position.
fn line_column_offset(src: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}
