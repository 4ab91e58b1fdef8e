//! Locate report workbooks by a date-encoded file name
//!
//! A template such as `StatsReports_yyyyMMdd.xlsx` is compiled into an
//! anchored regex: every literal character is escaped and each placeholder
//! (`yyyy`/`YYYY`, `MM`, `dd`/`DD`) becomes a named capture of exactly that
//! many digits. Files whose names do not match, or whose digits do not form a
//! calendar date, are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{ReportError, Result};
use crate::model::ReportFile;
use crate::observer::{Diagnostic, ReportObserver};

/// Placeholder tokens, longest first so `yyyy` wins over any shorter token
const PLACEHOLDERS: &[(&str, &str)] = &[
    ("yyyy", r"(?P<year>\d{4})"),
    ("YYYY", r"(?P<year>\d{4})"),
    ("MM", r"(?P<month>\d{2})"),
    ("dd", r"(?P<day>\d{2})"),
    ("DD", r"(?P<day>\d{2})"),
];

/// Result of matching one file name against a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    Matched { digits: String, date: NaiveDate },
    /// The name does not fully match the template
    Mismatch,
    /// The name matched but the digits are not a calendar date
    InvalidDate { digits: String },
}

/// A compiled file name template
#[derive(Debug, Clone)]
pub struct FilenameTemplate {
    template: String,
    pattern: Regex,
}

impl FilenameTemplate {
    /// Compile a template into an anchored pattern
    ///
    /// Placeholder tokens are recognised anywhere, including inside words, so
    /// a literal such as `ADDRESS_` or `SUMMARY_` (which contain `DD` and `MM`)
    /// claims a placeholder and the template is rejected as `InvalidTemplate`
    /// naming the repeated token.
    pub fn compile(template: &str) -> Result<Self> {
        let mut source = String::from("^");
        let mut rest = template;
        let mut literal = String::new();
        let mut seen: Vec<&str> = Vec::with_capacity(3);

        'scan: while !rest.is_empty() {
            for (token, capture) in PLACEHOLDERS {
                if let Some(after) = rest.strip_prefix(token) {
                    let group = group_name(capture);
                    if seen.contains(&group) {
                        return Err(ReportError::InvalidTemplate {
                            template: template.to_string(),
                            reason: format!(
                                "placeholder '{}' fills the {} a second time; \
                                 date tokens may not appear inside literal text",
                                token, group
                            ),
                        });
                    }
                    seen.push(group);
                    source.push_str(&regex::escape(&literal));
                    literal.clear();
                    source.push_str(capture);
                    rest = after;
                    continue 'scan;
                }
            }

            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                literal.push(c);
            }
            rest = chars.as_str();
        }
        source.push_str(&regex::escape(&literal));
        source.push('$');

        let pattern = Regex::new(&source).map_err(|e| ReportError::InvalidTemplate {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        for group in ["year", "month", "day"] {
            if !pattern.capture_names().flatten().any(|name| name == group) {
                return Err(ReportError::InvalidTemplate {
                    template: template.to_string(),
                    reason: format!("missing {} placeholder", group),
                });
            }
        }

        Ok(Self {
            template: template.to_string(),
            pattern,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Anchored regex source the template compiled to
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn match_name(&self, file_name: &str) -> NameMatch {
        let Some(caps) = self.pattern.captures(file_name) else {
            return NameMatch::Mismatch;
        };

        let digits = format!("{}{}{}", &caps["year"], &caps["month"], &caps["day"]);
        match parse_basic_date(&digits) {
            Some(date) => NameMatch::Matched { digits, date },
            None => NameMatch::InvalidDate { digits },
        }
    }
}

/// `year` from `(?P<year>\d{4})`
fn group_name(capture: &'static str) -> &'static str {
    capture
        .trim_start_matches("(?P<")
        .split('>')
        .next()
        .unwrap_or(capture)
}

/// Parse an 8-digit `yyyyMMdd` string
fn parse_basic_date(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

/// Finds report files in one directory
#[derive(Debug, Clone)]
pub struct ReportFileLocator {
    directory: PathBuf,
    template: FilenameTemplate,
}

impl ReportFileLocator {
    pub fn new(directory: impl Into<PathBuf>, template: &str) -> Result<Self> {
        Ok(Self {
            directory: directory.into(),
            template: FilenameTemplate::compile(template)?,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn template(&self) -> &FilenameTemplate {
        &self.template
    }

    /// All matching files, ascending by report date then file name
    ///
    /// An unreadable directory yields an empty list and a
    /// [`Diagnostic::DirectoryUnavailable`] event.
    pub fn find_report_files(&self, observer: &dyn ReportObserver) -> Vec<ReportFile> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                observer.emit(Diagnostic::DirectoryUnavailable {
                    directory: self.directory.clone(),
                    reason: e.to_string(),
                });
                return Vec::new();
            }
        };

        let mut files: Vec<ReportFile> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| !path.is_dir())
            .filter_map(|path| self.to_report_file(path, observer))
            .collect();

        files.sort_by(|a, b| {
            a.report_date()
                .cmp(&b.report_date())
                .then_with(|| a.file_name().cmp(&b.file_name()))
        });
        files
    }

    /// The last file of [`find_report_files`](Self::find_report_files), if any
    pub fn find_latest_report_file(&self, observer: &dyn ReportObserver) -> Option<ReportFile> {
        self.find_report_files(observer).pop()
    }

    fn to_report_file(&self, path: PathBuf, observer: &dyn ReportObserver) -> Option<ReportFile> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();

        match self.template.match_name(&file_name) {
            NameMatch::Matched { date, .. } => {
                observer.emit(Diagnostic::ReportFileFound {
                    path: path.clone(),
                    report_date: date.to_string(),
                });
                Some(ReportFile::new(path, date))
            }
            NameMatch::Mismatch => {
                observer.emit(Diagnostic::FilenamePatternMismatch { file_name });
                None
            }
            NameMatch::InvalidDate { digits } => {
                observer.emit(Diagnostic::DateParseFailure { file_name, digits });
                None
            }
        }
    }
}
