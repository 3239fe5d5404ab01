//! Error types surfaced by the parse and export pipelines.

use thiserror::Error;

/// Failure while turning an uploaded document into canonical entities.
///
/// Every variant renders as a single line so it can be shown verbatim as
/// the upload error message.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Top-level shape not recognized, or it resolved to an empty collection.
    #[error("{0}")]
    Format(String),

    /// A single record failed validation; the whole upload is rejected.
    #[error("record {index}: {message}")]
    Validation { index: usize, message: String },

    /// The uploaded text is not JSON at all.
    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub(crate) fn validation(index: usize, message: impl Into<String>) -> Self {
        Self::Validation {
            index,
            message: message.into(),
        }
    }
}

/// Failure while writing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
