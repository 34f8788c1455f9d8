//! Result report writer
//!
//! Filters captured serial lines down to record lines and writes them as one
//! CSV file per (suite, test), without a header row.

use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::jobs::Job;
use crate::utils;

/// Closed set of record-type tags.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    prefixes: Vec<String>,
}

impl RecordFilter {
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Self {
        Self {
            prefixes: tags.iter().map(|t| format!("{},", t.as_ref())).collect(),
        }
    }

    /// True when the trimmed line starts with `<TAG>,` for a known tag.
    pub fn is_record(&self, line: &str) -> bool {
        let line = line.trim();
        self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }
}

/// Loose banner heuristic: mentions the test and `token`, ignoring case.
pub fn is_banner(line: &str, test: &str, token: &str) -> bool {
    utils::mentions(line, test, token)
}

/// What happens to one captured line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDisposition {
    Record(Vec<String>),
    Blank,
    Comment,
    Banner,
    Unexpected,
}

pub struct ReportWriter {
    results_dir: PathBuf,
    filter: RecordFilter,
}

impl ReportWriter {
    pub fn new(results_dir: &Path, filter: RecordFilter) -> Self {
        Self {
            results_dir: results_dir.to_path_buf(),
            filter,
        }
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    /// `<results>/<suite>/<test>.csv`
    pub fn report_path(&self, job: &Job) -> PathBuf {
        self.results_dir.join(&job.suite).join(format!("{}.csv", job.test))
    }

    /// Classifies a line; record prefixes win over the banner heuristic.
    pub fn classify(&self, job: &Job, line: &str) -> LineDisposition {
        let stripped = line.trim();
        if stripped.is_empty() {
            return LineDisposition::Blank;
        }
        if stripped.starts_with('#') {
            return LineDisposition::Comment;
        }
        if self.filter.is_record(stripped) {
            return LineDisposition::Record(stripped.split(',').map(|f| f.to_string()).collect());
        }
        if is_banner(stripped, &job.test, "start") || is_banner(stripped, &job.test, "end") {
            return LineDisposition::Banner;
        }
        LineDisposition::Unexpected
    }

    /// Returns the records among `lines`, in order.
    pub fn records(&self, job: &Job, lines: &[String]) -> Vec<Vec<String>> {
        lines
            .iter()
            .filter_map(|line| match self.classify(job, line) {
                LineDisposition::Record(fields) => Some(fields),
                LineDisposition::Unexpected => {
                    debug!("Ignoring unexpected line: '{}'", line.trim());
                    None
                }
                LineDisposition::Banner => {
                    debug!("Ignoring banner line: '{}'", line.trim());
                    None
                }
                LineDisposition::Blank | LineDisposition::Comment => None,
            })
            .collect()
    }

    /// Writes the report for `job`, creating it even when nothing qualifies.
    pub fn write(&self, job: &Job, lines: &[String]) -> Result<PathBuf> {
        let path = self.report_path(job);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create report directory: {}", parent.display()))?;
        }

        let records = self.records(job, lines);
        if lines.is_empty() {
            warn!("No log lines captured for {}. Writing empty report.", job);
        } else {
            info!(
                "Parsed {} lines into {} records, writing {}",
                lines.len(),
                records.len(),
                path.display()
            );
        }

        // Records carry different field counts, so the writer is flexible.
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_path(&path)
            .with_context(|| format!("Unable to create report file: {}", path.display()))?;
        for fields in &records {
            wtr.write_record(fields)
                .with_context(|| format!("Unable to write report file: {}", path.display()))?;
        }
        wtr.flush()
            .with_context(|| format!("Unable to write report file: {}", path.display()))?;

        Ok(path)
    }
}
