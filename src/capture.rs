//! Serial capture state machine
//!
//! Waits for `<test> start`, collects lines until `<test> end` and classifies
//! how the run ended. One deadline covers the whole session; it is not reset
//! when the start banner shows up.

use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::connection::LineSource;
use crate::reporter::{is_banner, RecordFilter};

/// Pause after an empty read, in case the source returns without blocking.
const IDLE_BACKOFF: Duration = Duration::from_millis(5);

/// How a capture session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Start and end banners seen.
    Success,
    /// Deadline passed before the start banner.
    NoStart,
    /// Deadline passed after the start banner: the target crashed or hung.
    NoEnd,
    /// The connection failed while reading.
    SerialError,
    /// The run was interrupted by the user.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    AwaitingStart,
    Collecting,
    Terminal(CaptureStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub status: CaptureStatus,
    /// Raw lines seen between the banners, in arrival order.
    pub lines: Vec<String>,
}

pub struct CaptureSession<'a> {
    test: String,
    timeout: Duration,
    records: &'a RecordFilter,
    stop: Option<Arc<AtomicBool>>,
    state: CaptureState,
    lines: Vec<String>,
}

impl<'a> CaptureSession<'a> {
    pub fn new(test: &str, timeout: Duration, records: &'a RecordFilter) -> Self {
        Self {
            test: test.to_string(),
            timeout,
            records,
            stop: None,
            state: CaptureState::AwaitingStart,
            lines: Vec::new(),
        }
    }

    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    fn stopped(&self) -> bool {
        self.stop.as_ref().is_some_and(|s| s.load(Ordering::SeqCst))
    }

    /// Feeds one line through the state machine.
    pub fn on_line(&mut self, line: &str) {
        // A record line is data, even when it happens to look like a banner.
        let is_record = self.records.is_record(line);
        match self.state {
            CaptureState::AwaitingStart => {
                if !is_record && is_banner(line, &self.test, "start") {
                    info!("Detected start banner: '{}'. Beginning to collect logs.", line);
                    self.state = CaptureState::Collecting;
                }
            }
            CaptureState::Collecting => {
                if !is_record && is_banner(line, &self.test, "end") {
                    info!("Detected end banner: '{}'. Stopping collection.", line);
                    self.state = CaptureState::Terminal(CaptureStatus::Success);
                } else {
                    self.lines.push(line.to_string());
                }
            }
            CaptureState::Terminal(_) => {}
        }
    }

    /// Marks the deadline as passed.
    pub fn on_timeout(&mut self) {
        self.state = match self.state {
            CaptureState::AwaitingStart => {
                warn!("Timeout waiting for '{} start'. Giving up.", self.test);
                CaptureState::Terminal(CaptureStatus::NoStart)
            }
            CaptureState::Collecting => {
                warn!(
                    "Timeout waiting for '{} end' after {} lines. Target crashed or hung.",
                    self.test,
                    self.lines.len()
                );
                CaptureState::Terminal(CaptureStatus::NoEnd)
            }
            terminal => terminal,
        };
    }

    /// Reads from `source` until a terminal state is reached.
    pub fn run(mut self, source: &mut dyn LineSource) -> CaptureOutcome {
        info!("Waiting (up to {:?}) for banner '{} start'", self.timeout, self.test);
        let deadline = Instant::now() + self.timeout;

        let status = loop {
            if let CaptureState::Terminal(status) = self.state {
                break status;
            }
            if self.stopped() {
                warn!("Capture of '{}' interrupted", self.test);
                self.state = CaptureState::Terminal(CaptureStatus::Interrupted);
                continue;
            }
            if Instant::now() > deadline {
                self.on_timeout();
                continue;
            }

            match source.read_line() {
                Ok(Some(line)) => {
                    debug!("serial: {}", line);
                    self.on_line(&line);
                }
                Ok(None) => thread::sleep(IDLE_BACKOFF),
                Err(e) => {
                    error!("Serial read error: {e}");
                    self.state = CaptureState::Terminal(CaptureStatus::SerialError);
                }
            }
        };

        CaptureOutcome {
            status,
            lines: self.lines,
        }
    }
}
