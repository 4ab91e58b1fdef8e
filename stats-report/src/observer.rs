//! Diagnostics emitted by the pipeline
//!
//! Components never log directly. They receive a `&dyn ReportObserver` and
//! hand it typed [`Diagnostic`] events, so callers decide where the events
//! go: [`LogObserver`] forwards them to the `log` facade, while
//! [`RecordingObserver`] keeps them for assertions in tests.

use std::path::PathBuf;
use std::sync::Mutex;

/// A single event raised while locating or summarizing a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The report directory is missing or could not be listed
    DirectoryUnavailable { directory: PathBuf, reason: String },
    /// A file name did not fully match the configured template
    FilenamePatternMismatch { file_name: String },
    /// The captured digits did not form a calendar date
    DateParseFailure { file_name: String, digits: String },
    /// A candidate report file was accepted
    ReportFileFound { path: PathBuf, report_date: String },
    /// The workbook was opened and lists these worksheets
    WorkbookOpened { origin: String, sheet_count: usize },
    /// An expected worksheet is absent from the workbook
    MissingSheet { sheet: String, origin: String },
    /// A worksheet was reduced to a summary
    SheetSummarized {
        sheet: String,
        row_count: usize,
        column_count: usize,
    },
}

impl Diagnostic {
    /// The `log` level this event is reported at
    pub fn level(&self) -> log::Level {
        match self {
            Diagnostic::DirectoryUnavailable { .. }
            | Diagnostic::DateParseFailure { .. }
            | Diagnostic::MissingSheet { .. } => log::Level::Warn,
            Diagnostic::ReportFileFound { .. } | Diagnostic::WorkbookOpened { .. } => {
                log::Level::Info
            }
            Diagnostic::FilenamePatternMismatch { .. } | Diagnostic::SheetSummarized { .. } => {
                log::Level::Debug
            }
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DirectoryUnavailable { directory, reason } => write!(
                f,
                "Report directory unavailable: {} ({})",
                directory.display(),
                reason
            ),
            Diagnostic::FilenamePatternMismatch { file_name } => {
                write!(f, "Skipping file that does not match pattern: {}", file_name)
            }
            Diagnostic::DateParseFailure { file_name, digits } => write!(
                f,
                "Failed to parse report date '{}' from file name: {}",
                digits, file_name
            ),
            Diagnostic::ReportFileFound { path, report_date } => {
                write!(f, "Found report file {} dated {}", path.display(), report_date)
            }
            Diagnostic::WorkbookOpened {
                origin,
                sheet_count,
            } => write!(f, "Opened workbook {} with {} sheet(s)", origin, sheet_count),
            Diagnostic::MissingSheet { sheet, origin } => {
                write!(f, "Missing expected sheet '{}' in report {}", sheet, origin)
            }
            Diagnostic::SheetSummarized {
                sheet,
                row_count,
                column_count,
            } => write!(
                f,
                "Summarized sheet '{}': {} row(s), {} column(s)",
                sheet, row_count, column_count
            ),
        }
    }
}

/// Receives diagnostics from the pipeline components
pub trait ReportObserver {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ReportObserver for LogObserver {
    fn emit(&self, diagnostic: Diagnostic) {
        log::log!(target: "stats_report", diagnostic.level(), "{}", diagnostic);
    }
}

/// Drops every diagnostic
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ReportObserver for NullObserver {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory, in emission order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count_where(&self, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }
}

impl ReportObserver for RecordingObserver {
    fn emit(&self, diagnostic: Diagnostic) {
        match self.events.lock() {
            Ok(mut events) => events.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
