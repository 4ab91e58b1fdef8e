//! Weekly statistics workbook ingestion
//!
//! Locates the newest workbook in a drop directory, summarizes the expected
//! worksheets and shapes each report section into escaped, column-keyed
//! records for whatever renders or mails the report.
//!
//! ```no_run
//! use stats_report::locator::ReportFileLocator;
//! use stats_report::observer::LogObserver;
//! use stats_report::render::{EXPECTED_SHEETS, SectionPayload};
//! use stats_report::workbook::{SampleRetention, WorkbookSummarizer};
//!
//! # fn main() -> Result<(), stats_report::error::ReportError> {
//! let locator = ReportFileLocator::new("reports", "StatsReports_yyyyMMdd.xlsx")?;
//! if let Some(file) = locator.find_latest_report_file(&LogObserver) {
//!     let summarizer = WorkbookSummarizer::new(EXPECTED_SHEETS, SampleRetention::All);
//!     let summary = summarizer.summarize_file(&file, &LogObserver)?;
//!     for payload in SectionPayload::build_all(&summary) {
//!         println!("{} {}", payload.section.id, payload.records_json());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod locator;
pub mod model;
pub mod observer;
pub mod render;
pub mod workbook;

pub use error::{ReportError, Result};
pub use locator::{FilenameTemplate, NameMatch, ReportFileLocator};
pub use model::{ReportFile, ReportSummary, SheetSummary};
pub use observer::{Diagnostic, LogObserver, NullObserver, RecordingObserver, ReportObserver};
pub use workbook::{SampleRetention, WorkbookSummarizer};
