//! Summarize command handler

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::*;
use serde::Serialize;
use serde_json::value::RawValue;

use super::SummarizeCommands;
use stats_report::config::AppConfig;
use stats_report::locator::{FilenameTemplate, NameMatch, ReportFileLocator};
use stats_report::model::{ReportFile, ReportSummary};
use stats_report::observer::LogObserver;
use stats_report::render::{EXPECTED_SHEETS, KeyFigures, SectionPayload, format_integer};
use stats_report::workbook::{SampleRetention, WorkbookSummarizer};

/// What a renderer or mailer receives
#[derive(Serialize)]
struct Handoff<'a> {
    summary: &'a ReportSummary,
    key_figures: KeyFigures,
    sections: Vec<SectionHandoff>,
}

#[derive(Serialize)]
struct SectionHandoff {
    id: &'static str,
    title: &'static str,
    sheet: &'static str,
    sheet_present: bool,
    row_count: usize,
    columns: Vec<String>,
    /// Already escaped for embedding, passed through verbatim
    records: Box<RawValue>,
}

pub fn handle_summarize_command(args: SummarizeCommands, config: &AppConfig) -> Result<()> {
    let retention = if args.all_rows {
        SampleRetention::All
    } else if let Some(n) = args.sample_rows {
        SampleRetention::Leading(n)
    } else {
        config.sample_rows
    };

    let report_file = resolve_report_file(&args, config)?;
    log::info!("Processing report file: {}", report_file.path().display());

    let summarizer = WorkbookSummarizer::new(EXPECTED_SHEETS, retention);
    let summary = summarizer
        .summarize_file(&report_file, &LogObserver)
        .with_context(|| format!("Failed to summarize {}", report_file.path().display()))?;

    let output = if args.json {
        render_json(&summary)?
    } else {
        render_text(&summary)
    };

    match args.output {
        Some(path) => {
            fs::write(&path, &output)
                .with_context(|| format!("Failed to write output to: {}", path.display()))?;
            println!("Summary saved to: {}", path.display().to_string().bright_green());
        }
        None => println!("{}", output),
    }

    Ok(())
}

fn resolve_report_file(args: &SummarizeCommands, config: &AppConfig) -> Result<ReportFile> {
    if let Some(path) = &args.file {
        if !path.is_file() {
            bail!("Workbook does not exist: {}", path.display());
        }
        let date = match args.date {
            Some(date) => date,
            None => date_from_name(path, &config.file_pattern)?,
        };
        return Ok(ReportFile::new(path, date));
    }

    let locator = ReportFileLocator::new(&config.report_directory, &config.file_pattern)
        .with_context(|| format!("Invalid file pattern: {}", config.file_pattern))?;

    locator
        .find_latest_report_file(&LogObserver)
        .with_context(|| {
            format!(
                "No report files were found in {}",
                config.report_directory.display()
            )
        })
}

fn date_from_name(path: &Path, pattern: &str) -> Result<chrono::NaiveDate> {
    let template = FilenameTemplate::compile(pattern)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match template.match_name(&name) {
        NameMatch::Matched { date, .. } => Ok(date),
        NameMatch::InvalidDate { digits } => {
            bail!("'{}' in {} is not a valid date; pass --date", digits, name)
        }
        NameMatch::Mismatch => bail!(
            "{} does not match pattern {}; pass --date to summarize it anyway",
            name,
            pattern
        ),
    }
}

fn render_json(summary: &ReportSummary) -> Result<String> {
    let sections = SectionPayload::build_all(summary)
        .into_iter()
        .map(|payload| {
            let records = RawValue::from_string(payload.records_json())
                .with_context(|| format!("Invalid records for section {}", payload.section.id))?;
            Ok(SectionHandoff {
                id: payload.section.id,
                title: payload.section.title,
                sheet: payload.section.sheet,
                sheet_present: payload.sheet_present,
                row_count: payload.row_count,
                columns: payload.columns,
                records,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let handoff = Handoff {
        summary,
        key_figures: KeyFigures::from_summary(summary),
        sections,
    };
    serde_json::to_string_pretty(&handoff).context("Failed to format JSON output")
}

fn render_text(summary: &ReportSummary) -> String {
    let figures = KeyFigures::from_summary(summary);
    let mut lines = Vec::new();

    lines.push(format!(
        "{} {}",
        "Report date:".bold(),
        summary.report_date().format("%B %d, %Y")
    ));
    lines.push(format!(
        "{} {}",
        "Generated at:".bold(),
        summary.generated_at().to_rfc3339()
    ));
    lines.push(format!(
        "{} {} ({})",
        "Coverage:".bold(),
        figures
            .coverage_percent
            .map(|p| format!("{}%", p))
            .unwrap_or_else(|| "-".to_string()),
        figures.coverage_caption()
    ));
    lines.push(format!(
        "{} {}",
        "Records analysed:".bold(),
        format_integer(figures.total_rows)
    ));
    if let Some(top) = &figures.top_sheet {
        lines.push(format!(
            "{} {} ({} rows)",
            "Top-volume worksheet:".bold(),
            top.name.cyan(),
            format_integer(top.row_count)
        ));
    }

    lines.push(String::new());
    for sheet in summary.sheet_summaries() {
        lines.push(format!(
            "  {:<28} {:>10} rows  {:>3} columns",
            sheet.sheet_name(),
            format_integer(sheet.row_count()),
            sheet.column_headers().len()
        ));
    }

    if !summary.missing_sheets().is_empty() {
        lines.push(String::new());
        lines.push(format!("{}", "Missing worksheets:".yellow().bold()));
        for name in summary.missing_sheets() {
            lines.push(format!("  - {}", name.yellow()));
        }
    }

    lines.join("\n")
}
