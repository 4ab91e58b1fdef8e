//! Shaping a [`ReportSummary`](crate::model::ReportSummary) for renderers
//!
//! Nothing in here produces markup. It resolves which columns a section
//! shows and turns rows into escaped, column-keyed records that a page or
//! email template can embed as-is.

pub mod columns;
pub mod metrics;
pub mod rows;
pub mod sections;

pub use columns::{merge_columns, resolve_columns};
pub use metrics::{KeyFigures, TopSheet, format_integer};
pub use rows::{
    SerializedRecord, UnescapeError, escape_value, records_json, serialize_rows, serialize_sheet,
    string_array_json, unescape_value,
};
pub use sections::{EXPECTED_SHEETS, REPORT_SECTIONS, ReportSection, SectionPayload, find_section};
