//! 统一的测试执行流程
//!
//! Runs jobs strictly one after another: open and drain the serial port, flash,
//! capture, write the report, record the outcome. A failing job never stops
//! the jobs after it; only an interrupt does.

use anyhow::Result;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::capture::{CaptureSession, CaptureStatus};
use crate::config::{CliArgs, Config};
use crate::connection::{Connector, SerialConnector};
use crate::flash::{FlashOrchestrator, FlashTool, ScriptFlasher};
use crate::jobs::{self, Job};
use crate::registry::{EntryPathKind, SuiteRegistry};
use crate::reporter::{RecordFilter, ReportWriter};
use crate::summary::{Outcome, RunSummary};

/// File name of the markdown summary inside the results directory.
pub const SUMMARY_FILE: &str = "summary.md";

pub struct Runner<'a, T: FlashTool, C: Connector> {
    flasher: FlashOrchestrator<'a, T>,
    connector: C,
    reporter: ReportWriter,
    capture_timeout: Duration,
    stop: Arc<AtomicBool>,
}

impl<'a, T: FlashTool, C: Connector> Runner<'a, T, C> {
    pub fn new(
        config: &Config,
        registry: &'a SuiteRegistry,
        tool: T,
        connector: C,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            flasher: FlashOrchestrator::new(registry, tool, config.retry_delay)
                .with_stop_flag(stop.clone()),
            connector,
            reporter: ReportWriter::new(&config.results_path(), RecordFilter::new(&config.record_tags)),
            capture_timeout: config.serial.capture_timeout,
            stop,
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Runs one job through the whole pipeline.
    pub fn run_job(&mut self, job: &Job) -> Outcome {
        // The port stays open across flashing so no early output is lost.
        let mut link = match self.connector.connect() {
            Ok(link) => link,
            Err(e) => {
                error!("{job}: {e}");
                return Outcome::SerialError;
            }
        };

        let rc = match self.flasher.flash(job) {
            Ok(rc) => rc,
            Err(e) => {
                error!("{job}: {e:#}");
                link.close();
                return Outcome::FlashFailure;
            }
        };
        if rc != 0 {
            link.close();
            return if self.stopped() { Outcome::Interrupted } else { Outcome::FlashFailure };
        }

        let outcome = CaptureSession::new(&job.test, self.capture_timeout, self.reporter.filter())
            .with_stop_flag(self.stop.clone())
            .run(link.as_mut());
        link.close();

        if outcome.status != CaptureStatus::Interrupted {
            if let Err(e) = self.reporter.write(job, &outcome.lines) {
                error!("Failed to write report for {job}: {e:#}");
            }
        }

        outcome.status.into()
    }

    /// Runs every job in order and aggregates the outcomes.
    pub fn run(&mut self, jobs: &[Job]) -> RunSummary {
        let mut summary = RunSummary::new();
        for (i, job) in jobs.iter().enumerate() {
            if self.stopped() {
                warn!("Interrupted, skipping {} remaining jobs", jobs.len() - i);
                summary.mark_interrupted();
                break;
            }
            info!("[{}/{}] {}", i + 1, jobs.len(), job);
            let outcome = self.run_job(job);
            summary.record(job, outcome);
            if outcome == Outcome::Interrupted {
                if i + 1 < jobs.len() {
                    summary.mark_interrupted();
                }
                break;
            }
        }
        summary
    }
}

/// Prints the suite registry.
fn print_registry(registry: &SuiteRegistry) {
    println!("{:16} {:18} {:7} {:12} retries", "suite", "demo", "entry", "tests");
    for suite in registry.suites() {
        let entry = match suite.entry_kind {
            EntryPathKind::Root => "root",
            EntryPathKind::Nested => "src/",
        };
        println!(
            "{:16} {:18} {:7} {:12} {}",
            suite.name, suite.demo, entry, suite.test_dir, suite.retries
        );
    }
}

/// Runs aeagle for parsed command line arguments and returns the exit code.
pub fn execute(args: &CliArgs, stop: Arc<AtomicBool>) -> Result<i32> {
    let mut config = Config::load(&args.root, args.config.as_deref())?;
    config.apply_cli(args);
    let registry = SuiteRegistry::from_config(&config);

    if args.list {
        print_registry(&registry);
        return Ok(0);
    }

    let (suite, test) = args.get_filters();
    let jobs = jobs::expand_jobs(&registry, suite, test)?;

    let connector = SerialConnector::new(config.serial.clone());
    let mut runner = Runner::new(&config, &registry, ScriptFlasher::new(), connector, stop);
    let summary = runner.run(&jobs);

    for line in summary.render().lines() {
        if summary.all_succeeded() {
            info!("{line}");
        } else {
            error!("{line}");
        }
    }

    let summary_path = config.results_path().join(SUMMARY_FILE);
    if let Err(e) = summary.write_markdown(&summary_path) {
        error!("{e:#}");
    }

    Ok(summary.exit_code())
}
