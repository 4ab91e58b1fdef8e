mod handler;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

pub use handler::handle_summarize_command;

#[derive(Args, Debug)]
pub struct SummarizeCommands {
    /// Workbook to summarize instead of the latest one in the report directory
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Report date for --file when its name does not follow the pattern
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Keep every data row instead of the configured sample
    #[arg(long, conflicts_with = "sample_rows")]
    pub all_rows: bool,

    /// Number of leading data rows to keep per worksheet
    #[arg(long)]
    pub sample_rows: Option<usize>,

    /// Emit the renderer handoff (summary, key figures, sections) as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
