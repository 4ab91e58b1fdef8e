//! Reduce the expected worksheets of a workbook to [`SheetSummary`] values

use std::fs;
use std::io::{Cursor, Read, Seek};
use std::str::FromStr;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};
use chrono::{Local, NaiveDate};

use crate::error::{ReportError, Result};
use crate::model::{ReportFile, ReportSummary, SheetSummary};
use crate::observer::{Diagnostic, ReportObserver};

use super::cell::{display_text, is_blank};

/// How many non-blank data rows a summary keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRetention {
    /// Keep the first `n` rows; every non-blank row is still counted
    Leading(usize),
    All,
}

impl SampleRetention {
    pub const DEFAULT_LEADING: usize = 5;

    fn keeps(&self, retained: usize) -> bool {
        match self {
            SampleRetention::Leading(limit) => retained < *limit,
            SampleRetention::All => true,
        }
    }
}

impl Default for SampleRetention {
    fn default() -> Self {
        SampleRetention::Leading(Self::DEFAULT_LEADING)
    }
}

impl FromStr for SampleRetention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(SampleRetention::All);
        }
        trimmed
            .parse::<usize>()
            .map(SampleRetention::Leading)
            .map_err(|_| format!("expected a row count or \"all\", got '{}'", s))
    }
}

impl std::fmt::Display for SampleRetention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleRetention::Leading(n) => write!(f, "{}", n),
            SampleRetention::All => write!(f, "all"),
        }
    }
}

/// Summarizes one workbook at a time against a fixed list of worksheet names
#[derive(Debug, Clone)]
pub struct WorkbookSummarizer {
    expected_sheets: Vec<String>,
    retention: SampleRetention,
}

impl WorkbookSummarizer {
    /// Duplicate names in `expected_sheets` are dropped, keeping the first
    pub fn new<S: AsRef<str>>(expected_sheets: &[S], retention: SampleRetention) -> Self {
        let mut names: Vec<String> = Vec::with_capacity(expected_sheets.len());
        for name in expected_sheets {
            let name = name.as_ref();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        Self {
            expected_sheets: names,
            retention,
        }
    }

    pub fn expected_sheets(&self) -> &[String] {
        &self.expected_sheets
    }

    pub fn retention(&self) -> SampleRetention {
        self.retention
    }

    /// Read and summarize a located report file
    pub fn summarize_file(
        &self,
        report: &ReportFile,
        observer: &dyn ReportObserver,
    ) -> Result<ReportSummary> {
        let origin = report.file_name();
        let bytes = fs::read(report.path())
            .map_err(|e| ReportError::workbook(origin.clone(), calamine::Error::Io(e)))?;
        self.summarize_bytes(bytes, report.report_date(), &origin, observer)
    }

    /// Summarize a workbook held in memory
    pub fn summarize_bytes(
        &self,
        bytes: Vec<u8>,
        report_date: NaiveDate,
        origin: &str,
        observer: &dyn ReportObserver,
    ) -> Result<ReportSummary> {
        self.summarize_reader(Cursor::new(bytes), report_date, origin, observer)
    }

    /// Summarize any seekable workbook source (xlsx, xlsm, xlsb, xls, ods)
    ///
    /// The workbook is owned by this call and dropped on every return path.
    /// Any open or read failure aborts the whole call; no partial summary is
    /// produced.
    pub fn summarize_reader<RS>(
        &self,
        source: RS,
        report_date: NaiveDate,
        origin: &str,
        observer: &dyn ReportObserver,
    ) -> Result<ReportSummary>
    where
        RS: Read + Seek + Clone,
    {
        let mut workbook: Sheets<RS> =
            open_workbook_auto_from_rs(source).map_err(|e| ReportError::workbook(origin, e))?;

        let available = workbook.sheet_names();
        observer.emit(Diagnostic::WorkbookOpened {
            origin: origin.to_string(),
            sheet_count: available.len(),
        });

        let mut sheet_summaries = Vec::new();
        let mut missing_sheets = Vec::new();

        for sheet_name in &self.expected_sheets {
            if !available.iter().any(|name| name == sheet_name) {
                observer.emit(Diagnostic::MissingSheet {
                    sheet: sheet_name.clone(),
                    origin: origin.to_string(),
                });
                missing_sheets.push(sheet_name.clone());
                continue;
            }

            let range = workbook
                .worksheet_range(sheet_name)
                .map_err(|e| ReportError::workbook(origin, e))?;

            let summary = summarize_range(sheet_name, &range, self.retention);
            observer.emit(Diagnostic::SheetSummarized {
                sheet: sheet_name.clone(),
                row_count: summary.row_count(),
                column_count: summary.column_headers().len(),
            });
            sheet_summaries.push(summary);
        }

        drop(workbook);

        Ok(ReportSummary::new(
            report_date,
            sheet_summaries,
            missing_sheets,
            Local::now(),
        ))
    }
}

static EMPTY_CELL: Data = Data::Empty;

/// Absolute-coordinate view over a calamine range
///
/// calamine trims leading empty rows and columns; positions before the
/// range start read as empty so column indices stay anchored at column A.
struct SheetGrid<'a> {
    range: &'a Range<Data>,
    start: (u32, u32),
    end: (u32, u32),
}

impl<'a> SheetGrid<'a> {
    fn new(range: &'a Range<Data>) -> Option<Self> {
        Some(Self {
            range,
            start: range.start()?,
            end: range.end()?,
        })
    }

    fn cell(&self, row: u32, col: u32) -> &Data {
        if row < self.start.0 || col < self.start.1 {
            return &EMPTY_CELL;
        }
        let relative = ((row - self.start.0) as usize, (col - self.start.1) as usize);
        self.range.get(relative).unwrap_or(&EMPTY_CELL)
    }

    /// Index of the last non-empty cell in a row
    fn last_cell(&self, row: u32) -> Option<u32> {
        (self.start.1..=self.end.1)
            .rev()
            .find(|col| !matches!(self.cell(row, *col), Data::Empty))
    }

    fn row_text(&self, row: u32, width: usize) -> Vec<String> {
        (0..width as u32)
            .map(|col| display_text(self.cell(row, col)))
            .collect()
    }

    fn is_blank_row(&self, row: u32, last: u32) -> bool {
        (0..=last).all(|col| is_blank(self.cell(row, col)))
    }
}

/// Header row is the first populated row; every later row up to the last
/// populated one is a data row.
pub(crate) fn summarize_range(
    sheet_name: &str,
    range: &Range<Data>,
    retention: SampleRetention,
) -> SheetSummary {
    let Some(grid) = SheetGrid::new(range) else {
        return SheetSummary::new(sheet_name, 0, Vec::new(), Vec::new());
    };

    let header_row = grid.start.0;
    let column_headers = match grid.last_cell(header_row) {
        Some(last) => grid.row_text(header_row, last as usize + 1),
        None => Vec::new(),
    };

    let mut row_count = 0;
    let mut rows = Vec::new();

    for row in (header_row + 1)..=grid.end.0 {
        let Some(last) = grid.last_cell(row) else {
            continue;
        };
        if grid.is_blank_row(row, last) {
            continue;
        }

        if retention.keeps(rows.len()) {
            let width = column_headers.len().max(last as usize + 1);
            rows.push(grid.row_text(row, width));
        }
        row_count += 1;
    }

    SheetSummary::new(sheet_name, row_count, column_headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NullObserver, RecordingObserver};
    use rust_xlsxwriter::Workbook;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn workbook_bytes(build: impl FnOnce(&mut Workbook)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        build(&mut workbook);
        workbook.save_to_buffer().unwrap()
    }

    fn write_rows(workbook: &mut Workbook, name: &str, rows: &[&[&str]]) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_missing_sheets_are_recorded_in_order() {
        let bytes = workbook_bytes(|wb| {
            write_rows(wb, "X", &[&["A"], &["1"]]);
            write_rows(wb, "Z", &[&["A"], &["2"], &["3"]]);
        });

        let summarizer = WorkbookSummarizer::new(&["X", "Y", "Z"], SampleRetention::All);
        let observer = RecordingObserver::new();
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &observer)
            .unwrap();

        assert_eq!(summary.sheet_names(), vec!["X", "Z"]);
        assert_eq!(summary.missing_sheets(), &["Y".to_string()]);
        assert_eq!(summary.total_row_count(), 3);
        assert_eq!(summary.report_date(), date());
        assert_eq!(
            observer.count_where(|d| matches!(d, Diagnostic::MissingSheet { sheet, .. } if sheet == "Y")),
            1
        );
    }

    #[test]
    fn test_header_only_sheet() {
        let bytes = workbook_bytes(|wb| write_rows(wb, "S", &[&["Name", "Count"]]));

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
            .unwrap();

        let sheet = summary.sheet("S").unwrap();
        assert_eq!(sheet.row_count(), 0);
        assert!(sheet.rows().is_empty());
        assert_eq!(sheet.column_headers(), &["Name".to_string(), "Count".to_string()]);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let bytes = workbook_bytes(|wb| {
            let sheet = wb.add_worksheet();
            sheet.set_name("S").unwrap();
            sheet.write_string(0, 0, "Name").unwrap();
            sheet.write_string(0, 1, "Count").unwrap();
            sheet.write_string(1, 0, "   ").unwrap();
            sheet.write_string(2, 0, "ICP").unwrap();
            sheet.write_number(2, 1, 12.0).unwrap();
        });

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
            .unwrap();

        let sheet = summary.sheet("S").unwrap();
        assert_eq!(sheet.row_count(), 1);
        assert_eq!(sheet.rows(), &[vec!["ICP".to_string(), "12".to_string()]]);
    }

    #[test]
    fn test_leading_retention_still_counts_every_row() {
        let bytes = workbook_bytes(|wb| {
            let sheet = wb.add_worksheet();
            sheet.set_name("S").unwrap();
            sheet.write_string(0, 0, "N").unwrap();
            for i in 1..=8u32 {
                sheet.write_number(i, 0, i as f64).unwrap();
            }
        });

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::Leading(5));
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
            .unwrap();

        let sheet = summary.sheet("S").unwrap();
        assert_eq!(sheet.row_count(), 8);
        assert_eq!(sheet.rows().len(), 5);
        assert_eq!(sheet.rows()[4], vec!["5".to_string()]);
    }

    #[test]
    fn test_rows_are_padded_to_header_width() {
        let bytes = workbook_bytes(|wb| {
            write_rows(
                wb,
                "S",
                &[&["A", "B", "C"], &["a1"], &["a2", "", "", "extra"]],
            );
        });

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
            .unwrap();

        let sheet = summary.sheet("S").unwrap();
        assert_eq!(sheet.rows()[0], vec!["a1", "", ""]);
        assert_eq!(sheet.rows()[1], vec!["a2", "", "", "extra"]);
    }

    #[test]
    fn test_duplicate_headers_are_kept() {
        let bytes = workbook_bytes(|wb| write_rows(wb, "S", &[&["A", "A", "B"], &["1", "2", "3"]]));

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
            .unwrap();

        assert_eq!(summary.sheet("S").unwrap().column_headers(), &["A", "A", "B"]);
    }

    #[test]
    fn test_data_offset_from_column_a_keeps_positions() {
        let bytes = workbook_bytes(|wb| {
            let sheet = wb.add_worksheet();
            sheet.set_name("S").unwrap();
            sheet.write_string(2, 1, "Service").unwrap();
            sheet.write_string(3, 1, "ICP").unwrap();
        });

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
            .unwrap();

        let sheet = summary.sheet("S").unwrap();
        assert_eq!(sheet.column_headers(), &["", "Service"]);
        assert_eq!(sheet.rows(), &[vec!["".to_string(), "ICP".to_string()]]);
    }

    #[test]
    fn test_empty_sheet() {
        let bytes = workbook_bytes(|wb| {
            wb.add_worksheet().set_name("S").unwrap();
        });

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let summary = summarizer
            .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
            .unwrap();

        let sheet = summary.sheet("S").unwrap();
        assert_eq!(sheet.row_count(), 0);
        assert!(sheet.column_headers().is_empty());
    }

    #[test]
    fn test_corrupt_workbook_is_a_parse_error() {
        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let err = summarizer
            .summarize_bytes(b"not a workbook".to_vec(), date(), "bad.xlsx", &NullObserver)
            .unwrap_err();

        assert!(err.is_workbook_parse());
    }

    #[test]
    fn test_unreadable_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let report = ReportFile::new(dir.path().join("StatsReports_20240105.xlsx"), date());

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let err = summarizer.summarize_file(&report, &NullObserver).unwrap_err();
        assert!(err.is_workbook_parse());
    }

    #[test]
    fn test_summarize_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("StatsReports_20240105.xlsx");
        let bytes = workbook_bytes(|wb| write_rows(wb, "S", &[&["A"], &["1"]]));
        fs::write(&path, bytes).unwrap();

        let summarizer = WorkbookSummarizer::new(&["S"], SampleRetention::All);
        let summary = summarizer
            .summarize_file(&ReportFile::new(&path, date()), &NullObserver)
            .unwrap();
        assert_eq!(summary.total_row_count(), 1);
    }

    #[test]
    fn test_expected_sheets_are_deduplicated() {
        let summarizer = WorkbookSummarizer::new(&["X", "Y", "X"], SampleRetention::All);
        assert_eq!(summarizer.expected_sheets(), &["X", "Y"]);
    }

    #[test]
    fn test_sample_retention_from_str() {
        assert_eq!("all".parse::<SampleRetention>().unwrap(), SampleRetention::All);
        assert_eq!("ALL".parse::<SampleRetention>().unwrap(), SampleRetention::All);
        assert_eq!(" 12 ".parse::<SampleRetention>().unwrap(), SampleRetention::Leading(12));
        assert!("some".parse::<SampleRetention>().is_err());
        assert_eq!(SampleRetention::default(), SampleRetention::Leading(5));
    }

    mod proptests {
        use super::{date, workbook_bytes};
        use crate::observer::NullObserver;
        use crate::workbook::{SampleRetention, WorkbookSummarizer};
        use proptest::prelude::*;

        const EXPECTED: [&str; 4] = ["VW_A", "VW_B", "VW_C", "VW_D"];

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            /// `None` leaves the sheet out; `Some(n)` writes a header and n data rows
            #[test]
            fn prop_present_and_missing_partition_expected(
                layout in prop::collection::vec(prop::option::of(0usize..4), EXPECTED.len())
            ) {
                let bytes = workbook_bytes(|wb| {
                    wb.add_worksheet().set_name("Unrelated").unwrap();
                    for (name, rows) in EXPECTED.iter().zip(&layout).rev() {
                        let Some(rows) = rows else { continue };
                        let sheet = wb.add_worksheet();
                        sheet.set_name(*name).unwrap();
                        sheet.write_string(0, 0, "N").unwrap();
                        for r in 1..=*rows as u32 {
                            sheet.write_number(r, 0, r as f64).unwrap();
                        }
                    }
                });

                let summarizer = WorkbookSummarizer::new(&EXPECTED, SampleRetention::Leading(2));
                let summary = summarizer
                    .summarize_bytes(bytes, date(), "book.xlsx", &NullObserver)
                    .unwrap();

                let present: Vec<&str> = EXPECTED
                    .iter()
                    .zip(&layout)
                    .filter(|(_, rows)| rows.is_some())
                    .map(|(name, _)| *name)
                    .collect();
                let missing: Vec<&str> = EXPECTED
                    .iter()
                    .zip(&layout)
                    .filter(|(_, rows)| rows.is_none())
                    .map(|(name, _)| *name)
                    .collect();

                prop_assert_eq!(summary.sheet_names(), present);
                prop_assert_eq!(summary.missing_sheets().to_vec(), missing);
                prop_assert_eq!(
                    summary.total_row_count(),
                    layout.iter().flatten().sum::<usize>()
                );
                for sheet in summary.sheet_summaries() {
                    prop_assert!(sheet.rows().len() <= 2usize.min(sheet.row_count()));
                }
            }
        }
    }
}
