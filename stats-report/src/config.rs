//! Application configuration
//!
//! Settings come from a TOML file, then `STATS_REPORT_*` environment
//! variables (a `.env` file is honoured), then built-in defaults. The file
//! is looked up in this order:
//! 1. the path given on the command line
//! 2. `stats-report.toml` in the working directory
//! 3. `<config dir>/stats-report/config.toml`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ReportError, Result};
use crate::workbook::SampleRetention;

pub const LOCAL_CONFIG_FILE: &str = "stats-report.toml";
pub const DEFAULT_FILE_PATTERN: &str = "StatsReports_yyyyMMdd.xlsx";

const ENV_REPORT_DIRECTORY: &str = "STATS_REPORT_DIRECTORY";
const ENV_OUTPUT_DIRECTORY: &str = "STATS_REPORT_OUTPUT_DIRECTORY";
const ENV_FILE_PATTERN: &str = "STATS_REPORT_FILE_PATTERN";
const ENV_SAMPLE_ROWS: &str = "STATS_REPORT_SAMPLE_ROWS";
const ENV_LOG_LEVEL: &str = "STATS_REPORT_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Where the weekly workbooks are dropped
    pub report_directory: PathBuf,
    /// Where rendering collaborators write their output
    pub output_directory: PathBuf,
    /// File name template, e.g. `StatsReports_yyyyMMdd.xlsx`
    pub file_pattern: String,
    pub sample_rows: SampleRetention,
    pub log_level: String,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            report_directory: PathBuf::from("reports"),
            output_directory: PathBuf::from("generated-reports"),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            sample_rows: SampleRetention::default(),
            log_level: "info".to_string(),
            source: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    report_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    file_pattern: Option<String>,
    sample_rows: Option<SampleRowsSetting>,
    log_level: Option<String>,
}

/// `sample_rows = 5` or `sample_rows = "all"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SampleRowsSetting {
    Count(usize),
    Keyword(String),
}

impl AppConfig {
    /// Load from the first config file found, then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match Self::locate_file(explicit)? {
            Some(path) => {
                let text = fs::read_to_string(&path).map_err(|source| ReportError::Io {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml_str(&text, &path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok(), Path::new("environment"))?;
        Ok(config)
    }

    fn locate_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ReportError::Config {
                    path: path.to_path_buf(),
                    reason: "config file does not exist".to_string(),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(dirs::config_dir()
            .map(|dir| dir.join("stats-report").join("config.toml"))
            .filter(|path| path.is_file()))
    }

    /// Parse TOML text; `origin` is only used in error messages
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).map_err(|e| ReportError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

        let defaults = Self::default();
        let sample_rows = match file.sample_rows {
            None => defaults.sample_rows,
            Some(SampleRowsSetting::Count(n)) => SampleRetention::Leading(n),
            Some(SampleRowsSetting::Keyword(word)) => {
                word.parse().map_err(|reason| ReportError::Config {
                    path: origin.to_path_buf(),
                    reason,
                })?
            }
        };

        Ok(Self {
            report_directory: file.report_directory.unwrap_or(defaults.report_directory),
            output_directory: file.output_directory.unwrap_or(defaults.output_directory),
            file_pattern: file.file_pattern.unwrap_or(defaults.file_pattern),
            sample_rows,
            log_level: file.log_level.unwrap_or(defaults.log_level),
            source: Some(origin.to_path_buf()),
        })
    }

    /// Apply `STATS_REPORT_*` overrides from a variable lookup
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
        origin: &Path,
    ) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_REPORT_DIRECTORY) {
            self.report_directory = PathBuf::from(dir);
        }
        if let Some(dir) = get(ENV_OUTPUT_DIRECTORY) {
            self.output_directory = PathBuf::from(dir);
        }
        if let Some(pattern) = get(ENV_FILE_PATTERN) {
            self.file_pattern = pattern;
        }
        if let Some(rows) = get(ENV_SAMPLE_ROWS) {
            self.sample_rows = rows.parse().map_err(|reason| ReportError::Config {
                path: origin.to_path_buf(),
                reason: format!("{}: {}", ENV_SAMPLE_ROWS, reason),
            })?;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        Ok(())
    }
}
