//! Typed errors for matrix loading and rendering.
//!
//! The CLI layer wraps these in `anyhow` with context; lower layers return them
//! directly so callers can match on the failure class.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or loading a latency matrix.
#[derive(Error, Debug)]
pub enum MatrixError {
    /// No rows, or only blank rows, in the input
    #[error("empty input: the matrix has no rows")]
    Empty,

    /// A row does not fit an N x N matrix
    #[error("matrix is not square: row {row} has {found} cells, expected at most {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Every cell is NaN, so no range or statistic can be derived
    #[error("matrix contains no measurements (every cell is NaN)")]
    NoData,

    /// A cell could not be read as a number
    #[error("line {line}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        line: usize,
        column: usize,
        value: String,
    },

    /// Structurally valid JSON that is not a matrix
    #[error("unsupported JSON layout: {0}")]
    Layout(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while turning a plan into an image.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The plotting backend failed (font lookup, file write, ...)
    #[error("drawing failed: {0}")]
    Backend(String),

    /// The output extension has no backend
    #[error("unsupported output format for {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// SVG to PDF conversion failed
    #[error("PDF conversion failed: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn backend(e: impl std::fmt::Display) -> Self {
        RenderError::Backend(e.to_string())
    }

    pub(crate) fn pdf(e: impl std::fmt::Display) -> Self {
        RenderError::Pdf(e.to_string())
    }
}
