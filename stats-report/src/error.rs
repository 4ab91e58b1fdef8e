//! Error types for the report pipeline
//!
//! Expected conditions (a file name that does not match the template, a
//! worksheet that is not in the workbook) are not errors. They travel as
//! [`Diagnostic`](crate::observer::Diagnostic) events or as data on the
//! summary instead.

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the library
#[derive(Debug, Error)]
pub enum ReportError {
    /// The workbook could not be opened or one of its worksheets could not be read
    #[error("failed to read workbook {origin}: {source}")]
    WorkbookParse {
        origin: String,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file name template could not be compiled into a matcher
    #[error("invalid file name template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl ReportError {
    pub(crate) fn workbook(origin: impl Into<String>, source: calamine::Error) -> Self {
        ReportError::WorkbookParse {
            origin: origin.into(),
            source,
        }
    }

    /// True when the error came from opening or parsing a workbook
    pub fn is_workbook_parse(&self) -> bool {
        matches!(self, ReportError::WorkbookParse { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
