// File: summary.rs
// Description: Run summary, console rendering and the markdown summary file.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::capture::CaptureStatus;
use crate::jobs::Job;

/// Final outcome of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Resolution error or non-zero flash tool exit.
    FlashFailure,
    NoStart,
    /// Started but never finished: crashed or hung.
    NoEnd,
    SerialError,
    Interrupted,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::FlashFailure => "flash failure",
            Outcome::NoStart => "no-start timeout",
            Outcome::NoEnd => "crashed/hung",
            Outcome::SerialError => "serial error",
            Outcome::Interrupted => "interrupted",
        }
    }
}

impl From<CaptureStatus> for Outcome {
    fn from(status: CaptureStatus) -> Self {
        match status {
            CaptureStatus::Success => Outcome::Success,
            CaptureStatus::NoStart => Outcome::NoStart,
            CaptureStatus::NoEnd => Outcome::NoEnd,
            CaptureStatus::SerialError => Outcome::SerialError,
            CaptureStatus::Interrupted => Outcome::Interrupted,
        }
    }
}

/// Failure categories in the order they are reported.
const CATEGORIES: [(Outcome, &str); 5] = [
    (Outcome::FlashFailure, "Flash failures"),
    (Outcome::NoStart, "No-start timeouts"),
    (Outcome::NoEnd, "Crashed or hung tests"),
    (Outcome::SerialError, "Serial errors"),
    (Outcome::Interrupted, "Interrupted"),
];

#[derive(Debug, Default)]
pub struct RunSummary {
    entries: Vec<(Job, Outcome)>,
    interrupted: bool,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, job: &Job, outcome: Outcome) {
        self.entries.push((job.clone(), outcome));
    }

    /// Jobs were left unrun because of an interrupt.
    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    pub fn entries(&self) -> &[(Job, Outcome)] {
        &self.entries
    }

    pub fn outcome(&self, job: &Job) -> Option<Outcome> {
        self.entries.iter().find(|(j, _)| j == job).map(|(_, o)| *o)
    }

    pub fn jobs_with(&self, outcome: Outcome) -> Vec<&Job> {
        self.entries
            .iter()
            .filter(|(_, o)| *o == outcome)
            .map(|(j, _)| j)
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        !self.interrupted && self.entries.iter().all(|(_, o)| *o == Outcome::Success)
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() { 0 } else { 1 }
    }

    /// Human readable summary, one section per non-empty failure category.
    pub fn render(&self) -> String {
        let mut out = String::from("───────── SUMMARY ─────────\n");
        if self.all_succeeded() {
            let _ = writeln!(out, "All {} tests flashed and captured successfully", self.entries.len());
            return out;
        }
        for (outcome, title) in CATEGORIES {
            let jobs = self.jobs_with(outcome);
            if jobs.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{} ({}):", title, jobs.len());
            for job in jobs {
                let _ = writeln!(out, "  {:16} {}", job.suite, job.test);
            }
        }
        if self.interrupted {
            out.push_str("Run interrupted before all jobs finished\n");
        }
        out
    }

    /// Markdown table of every job, timestamped.
    pub fn to_markdown(&self) -> String {
        let mut markdown = String::new();
        markdown.push_str("# Test Run Summary\n\n");
        let _ = writeln!(
            markdown,
            "Generated: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        markdown.push_str("| Suite | Test | Result |\n|---|---|---|\n");
        for (job, outcome) in &self.entries {
            let _ = writeln!(markdown, "| {} | {} | {} |", job.suite, job.test, outcome.label());
        }
        markdown.push('\n');
        markdown
    }

    pub fn write_markdown(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }
        fs::write(path, self.to_markdown())
            .with_context(|| format!("Unable to write summary: {}", path.display()))
    }
}
