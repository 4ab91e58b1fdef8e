mod handler;

use std::path::PathBuf;

use clap::Args;

pub use handler::handle_locate_command;

#[derive(Args, Debug)]
pub struct LocateCommands {
    /// Directory to scan instead of the configured report directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// File name template, e.g. StatsReports_yyyyMMdd.xlsx
    #[arg(long)]
    pub pattern: Option<String>,

    /// Print only the path of the latest file
    #[arg(long)]
    pub latest: bool,
}
