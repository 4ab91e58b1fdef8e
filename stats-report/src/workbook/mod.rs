//! Workbook ingestion
//!
//! Opens a workbook once, walks the expected worksheets in order and turns
//! each one into a [`SheetSummary`](crate::model::SheetSummary). Worksheets
//! that are absent are recorded on the summary rather than treated as errors.

mod cell;
mod summarizer;

pub use cell::{display_text, is_blank};
pub use summarizer::{SampleRetention, WorkbookSummarizer};
