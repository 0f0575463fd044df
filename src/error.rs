//! Error types for report generation.
//!
//! Missing fields and overflow truncation are recovered inside the engine and
//! never show up here; only input that cannot be parsed at all and failures
//! of the output encoder are surfaced.

use std::io;
use thiserror::Error;

/// Result type alias for report-forge operations.
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    /// The request body could not be parsed into the expected record.
    #[error("malformed report input: {0}")]
    MalformedInput(String),

    /// The caller asked for a report type that does not exist.
    #[error("unknown report kind: {0}")]
    UnknownReportKind(String),

    /// A font program could not be parsed.
    #[error("font error: {0}")]
    Font(String),

    /// The layout configuration is not valid JSON for [`crate::config::LayoutConfig`].
    #[error("invalid layout config: {0}")]
    Config(String),

    /// I/O error while reading fonts or configuration.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The PDF writer could not finalise the byte stream.
    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

impl ReportError {
    /// Whether the failure is the caller's fault (bad request) rather than ours.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReportError::MalformedInput(_) | ReportError::UnknownReportKind(_)
        )
    }
}

impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        ReportError::Serialize(err.to_string())
    }
}
