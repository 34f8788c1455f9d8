//! Flash orchestration
//!
//! Swaps a test's source into its suite's demo project, runs the flash tool
//! with bounded retries and puts the demo project back the way it was.

mod backup;
mod tool;

pub use backup::{EntryFileGuard, BACKUP_EXTENSION};
#[cfg(test)]
pub use tool::MockFlashTool;
pub use tool::{FlashTool, ScriptFlasher};

use crate::error::AeagleError;
use crate::jobs::Job;
use crate::registry::SuiteRegistry;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often the stop flag is polled while waiting to retry.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct FlashOrchestrator<'a, T: FlashTool> {
    registry: &'a SuiteRegistry,
    tool: T,
    retry_delay: Duration,
    stop: Option<Arc<AtomicBool>>,
}

impl<'a, T: FlashTool> FlashOrchestrator<'a, T> {
    pub fn new(registry: &'a SuiteRegistry, tool: T, retry_delay: Duration) -> Self {
        Self {
            registry,
            tool,
            retry_delay,
            stop: None,
        }
    }

    /// No further attempts are started once `stop` is set.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stopped(&self) -> bool {
        self.stop.as_ref().is_some_and(|s| s.load(Ordering::SeqCst))
    }

    /// Sleeps for the retry delay in short slices. Returns false as soon as
    /// the stop flag is seen, including right after the last slice.
    fn wait_for_retry(&self) -> bool {
        let deadline = Instant::now() + self.retry_delay;
        loop {
            if self.stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(STOP_POLL_INTERVAL));
        }
    }

    /// Flashes one job and returns the last attempt's exit code.
    ///
    /// Missing test source, demo project or flash tool fail immediately with
    /// [`AeagleError::PathResolution`]; only a non-zero tool exit is retried.
    pub fn flash(&mut self, job: &Job) -> Result<i32> {
        let registry = self.registry;
        let suite = registry.resolve(&job.suite)?;
        let source = registry.test_source_path(suite, &job.test);
        if !source.is_file() {
            return Err(AeagleError::PathResolution { what: "Test source", path: source }.into());
        }
        let demo_dir = registry.demo_dir(suite);
        if !demo_dir.is_dir() {
            return Err(AeagleError::PathResolution { what: "Demo project", path: demo_dir }.into());
        }
        let script = registry.flash_tool_path(suite);
        if !script.is_file() {
            return Err(AeagleError::PathResolution { what: "Flash tool", path: script }.into());
        }

        let entry = registry.entry_path(suite);
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }

        let env: Vec<(String, String)> = suite.build_param.iter().cloned().collect();
        let attempts = suite.retries + 1;
        let guard = EntryFileGuard::acquire(&entry)?;

        let mut rc = 1;
        for n in 1..=attempts {
            info!("{:12} <- {}  (try {}/{})", job.suite, job.test, n, attempts);
            guard.install(&source)?;

            rc = self.tool.run(&script, &demo_dir, &env)?;
            if rc == 0 {
                info!("    flash succeeded");
                break;
            }

            warn!("    flash failed (code {})", rc);
            if n == attempts {
                break;
            }
            debug!("    retrying in {:?}", self.retry_delay);
            if !self.wait_for_retry() {
                warn!("    interrupted, not retrying");
                break;
            }
        }

        drop(guard);
        Ok(rc)
    }
}
