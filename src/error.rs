//! Error types for document loading and field resolution

use std::path::PathBuf;
use thiserror::Error;

/// Failure scoped to a single form field.
///
/// Only structural violations that would otherwise keep a traversal running
/// forever are reported; missing values, unknown tokens and absent detail
/// fields degrade to "field omitted" or "value passed through".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The parent chain of the field is cyclic or deeper than the traversal bound.
    #[error("malformed field hierarchy at '{field}': parent chain exceeds {depth} levels")]
    MalformedDocument { field: String, depth: usize },
}

/// Failure to open or parse a whole document. No partial output is produced.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The path does not exist.
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The bytes do not decode as a PDF.
    #[error("failed to parse PDF: {0}")]
    Malformed(String),
    /// The file exists but could not be read.
    #[error("failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
}
