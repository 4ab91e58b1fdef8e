//! Report data model
//!
//! All values here are built once and never mutated afterwards. Fields are
//! private and exposed through accessors so the invariants established at
//! construction time hold for every consumer.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

/// A workbook found on disk together with the date encoded in its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFile {
    path: PathBuf,
    report_date: NaiveDate,
}

impl ReportFile {
    pub fn new(path: impl Into<PathBuf>, report_date: NaiveDate) -> Self {
        Self {
            path: path.into(),
            report_date,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn report_date(&self) -> NaiveDate {
        self.report_date
    }

    /// File name component, used for logging and tie-breaking
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One worksheet reduced to its header row and non-blank data rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    sheet_name: String,
    row_count: usize,
    column_headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetSummary {
    /// `row_count` may exceed `rows.len()` when only a leading sample is retained
    pub fn new(
        sheet_name: impl Into<String>,
        row_count: usize,
        column_headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        debug_assert!(rows.len() <= row_count);
        Self {
            sheet_name: sheet_name.into(),
            row_count,
            column_headers,
            rows,
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_headers(&self) -> &[String] {
        &self.column_headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Position of a header by exact name; with duplicates the last one wins
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_headers.iter().rposition(|h| h == column)
    }

    /// Sum of the integer values of a column across the retained rows
    ///
    /// Thousands separators are ignored; cells that are not integers add nothing.
    pub fn column_total(&self, column: &str) -> i64 {
        let Some(idx) = self.column_index(column) else {
            return 0;
        };

        self.rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter_map(|cell| parse_integer(cell))
            .sum()
    }
}

fn parse_integer(cell: &str) -> Option<i64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// Everything extracted from one workbook read
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    report_date: NaiveDate,
    sheet_summaries: Vec<SheetSummary>,
    missing_sheets: Vec<String>,
    generated_at: DateTime<Local>,
}

impl ReportSummary {
    /// Summaries keep the order they are given in (the expected-sheet order)
    pub fn new(
        report_date: NaiveDate,
        sheet_summaries: Vec<SheetSummary>,
        missing_sheets: Vec<String>,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            report_date,
            sheet_summaries,
            missing_sheets,
            generated_at,
        }
    }

    pub fn report_date(&self) -> NaiveDate {
        self.report_date
    }

    pub fn sheet_summaries(&self) -> &[SheetSummary] {
        &self.sheet_summaries
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSummary> {
        self.sheet_summaries.iter().find(|s| s.sheet_name == name)
    }

    /// Worksheet names in insertion order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheet_summaries
            .iter()
            .map(|s| s.sheet_name.as_str())
            .collect()
    }

    pub fn missing_sheets(&self) -> &[String] {
        &self.missing_sheets
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    pub fn total_row_count(&self) -> usize {
        self.sheet_summaries.iter().map(|s| s.row_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: usize) -> SheetSummary {
        SheetSummary::new(
            name,
            rows,
            vec!["Name".to_string(), "Count".to_string()],
            (0..rows)
                .map(|i| vec![format!("row{}", i), (i * 10).to_string()])
                .collect(),
        )
    }

    #[test]
    fn test_total_row_count() {
        let summary = ReportSummary::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            vec![sheet("X", 3), sheet("Z", 4)],
            vec!["Y".to_string()],
            Local::now(),
        );

        assert_eq!(summary.total_row_count(), 7);
        assert_eq!(summary.sheet_names(), vec!["X", "Z"]);
        assert_eq!(summary.sheet("Z").unwrap().row_count(), 4);
        assert!(summary.sheet("Y").is_none());
    }

    #[test]
    fn test_column_total() {
        let summary = SheetSummary::new(
            "Counts",
            4,
            vec!["Service".to_string(), "Error_Count".to_string()],
            vec![
                vec!["A".to_string(), "1,200".to_string()],
                vec!["B".to_string(), " 30 ".to_string()],
                vec!["C".to_string(), "n/a".to_string()],
                vec!["D".to_string()],
            ],
        );

        assert_eq!(summary.column_total("Error_Count"), 1230);
        assert_eq!(summary.column_total("Missing"), 0);
    }

    #[test]
    fn test_column_total_uses_last_duplicate_header() {
        let summary = SheetSummary::new(
            "S",
            1,
            vec!["Count".to_string(), "Name".to_string(), "Count".to_string()],
            vec![vec!["1".to_string(), "x".to_string(), "40".to_string()]],
        );

        assert_eq!(summary.column_index("Count"), Some(2));
        assert_eq!(summary.column_total("Count"), 40);
    }

    #[test]
    fn test_report_file_name() {
        let file = ReportFile::new(
            "/data/StatsReports_20240105.xlsx",
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        );
        assert_eq!(file.file_name(), "StatsReports_20240105.xlsx");
    }
}
