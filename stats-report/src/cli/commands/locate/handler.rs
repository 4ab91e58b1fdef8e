//! Locate command handler

use anyhow::{Context, Result};
use colored::*;

use super::LocateCommands;
use stats_report::config::AppConfig;
use stats_report::locator::ReportFileLocator;
use stats_report::observer::LogObserver;

pub fn handle_locate_command(args: LocateCommands, config: &AppConfig) -> Result<()> {
    let directory = args.dir.unwrap_or_else(|| config.report_directory.clone());
    let pattern = args.pattern.unwrap_or_else(|| config.file_pattern.clone());

    let locator = ReportFileLocator::new(&directory, &pattern)
        .with_context(|| format!("Invalid file pattern: {}", pattern))?;
    let files = locator.find_report_files(&LogObserver);

    if args.latest {
        let latest = files.last().with_context(|| {
            format!(
                "No report files matching {} in {}",
                pattern,
                directory.display()
            )
        })?;
        println!("{}", latest.path().display());
        return Ok(());
    }

    if files.is_empty() {
        println!(
            "{} No report files matching {} in {}",
            "!".yellow().bold(),
            pattern.cyan(),
            directory.display()
        );
        return Ok(());
    }

    println!(
        "Found {} report file(s) in {}",
        files.len().to_string().bold(),
        directory.display()
    );
    let last = files.len() - 1;
    for (i, file) in files.iter().enumerate() {
        let line = format!("  {}  {}", file.report_date(), file.file_name());
        if i == last {
            println!("{} {}", line.bright_green(), "(latest)".dimmed());
        } else {
            println!("{}", line);
        }
    }

    Ok(())
}
