//! Headline figures shown above the report sections

use serde::Serialize;

use crate::model::ReportSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopSheet {
    pub name: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyFigures {
    pub processed_sheets: usize,
    pub missing_sheets: usize,
    pub expected_sheets: usize,
    /// Share of expected worksheets received, rounded; `None` when nothing was expected
    pub coverage_percent: Option<u32>,
    pub total_rows: usize,
    /// Worksheet with the most data rows; the earliest one wins a tie
    pub top_sheet: Option<TopSheet>,
}

impl KeyFigures {
    pub fn from_summary(summary: &ReportSummary) -> Self {
        let processed_sheets = summary.sheet_summaries().len();
        let missing_sheets = summary.missing_sheets().len();
        let expected_sheets = processed_sheets + missing_sheets;

        let coverage_percent = (expected_sheets > 0)
            .then(|| ((processed_sheets as f64 * 100.0) / expected_sheets as f64).round() as u32);

        let top_sheet = summary
            .sheet_summaries()
            .iter()
            .fold(None, |best: Option<&crate::model::SheetSummary>, sheet| match best {
                Some(b) if b.row_count() >= sheet.row_count() => Some(b),
                _ => Some(sheet),
            })
            .map(|sheet| TopSheet {
                name: sheet.sheet_name().to_string(),
                row_count: sheet.row_count(),
            });

        Self {
            processed_sheets,
            missing_sheets,
            expected_sheets,
            coverage_percent,
            total_rows: summary.total_row_count(),
            top_sheet,
        }
    }

    /// "3 of 7 worksheets received" style caption
    pub fn coverage_caption(&self) -> String {
        if self.expected_sheets == 0 {
            return "Awaiting initial data load".to_string();
        }
        format!(
            "{} of {} worksheets received",
            format_integer(self.processed_sheets),
            format_integer(self.expected_sheets)
        )
    }
}

/// Group digits in threes: `1234567` becomes `1,234,567`
pub fn format_integer(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
