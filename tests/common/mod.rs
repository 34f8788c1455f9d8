#![allow(dead_code)]

use aeagle::config::{Config, SuiteConfig};
use aeagle::connection::{Connector, LineSource};
use aeagle::error::AeagleError;
use aeagle::flash::FlashTool;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::{tempdir, TempDir};

/// A bench tree: tests/, apps/ with flash scripts, and a config pointing at it.
pub struct Bench {
    pub dir: TempDir,
    pub config: Config,
}

impl Bench {
    pub fn new(suites: &[(&str, &str)]) -> Self {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.root = dir.path().to_path_buf();
        config.suites = suites.iter().map(|(name, demo)| SuiteConfig::new(name, demo)).collect();
        config.retry_delay = Duration::from_millis(20);
        config.serial.capture_timeout = Duration::from_millis(300);
        for (_, demo) in suites {
            let demo_dir = dir.path().join("apps").join(demo);
            fs::create_dir_all(&demo_dir).unwrap();
            fs::write(demo_dir.join("flash.sh"), "#!/bin/sh\nexit 0\n").unwrap();
        }
        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn add_test(&self, test_dir: &str, test: &str) -> PathBuf {
        let path = self.root().join("tests").join(test_dir).join(format!("{test}.c"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("/* {test} */\n")).unwrap();
        path
    }

    pub fn write_entry(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join("apps").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_flash_script(&self, demo: &str, body: &str) {
        fs::write(self.root().join("apps").join(demo).join("flash.sh"), format!("#!/bin/sh\n{body}\n")).unwrap();
    }

    pub fn report(&self, suite: &str, test: &str) -> PathBuf {
        self.root().join("results/reports").join(suite).join(format!("{test}.csv"))
    }
}

/// Flash tool returning scripted exit codes and recording when it ran.
#[derive(Clone, Default)]
pub struct RecordingTool {
    codes: Arc<Mutex<VecDeque<i32>>>,
    pub calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl RecordingTool {
    pub fn with_codes(codes: &[i32]) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes.iter().copied().collect())),
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl FlashTool for RecordingTool {
    fn run(&mut self, script: &Path, _demo_dir: &Path, env: &[(String, String)]) -> anyhow::Result<i32> {
        assert!(script.is_file());
        let heap = env.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ");
        self.calls.lock().unwrap().push((heap, Instant::now()));
        Ok(self.codes.lock().unwrap().pop_front().unwrap_or(0))
    }
}

/// Replays lines, then stays silent.
pub struct ScriptedSource {
    lines: VecDeque<io::Result<Option<String>>>,
    closed: Arc<AtomicUsize>,
}

impl LineSource for ScriptedSource {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.pop_front().unwrap_or(Ok(None))
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub enum Session {
    Lines(Vec<&'static str>),
    ReadError(Vec<&'static str>),
    OpenFails,
}

/// Hands out one scripted session per connect.
#[derive(Default)]
pub struct ScriptedConnector {
    sessions: VecDeque<Session>,
    pub connects: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions: sessions.into(),
            ..Self::default()
        }
    }
}

impl Connector for ScriptedConnector {
    fn connect(&mut self) -> Result<Box<dyn LineSource>, AeagleError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let to_reads = |lines: Vec<&'static str>| -> VecDeque<io::Result<Option<String>>> {
            lines.into_iter().map(|l| Ok(Some(l.to_string()))).collect()
        };
        let lines = match self.sessions.pop_front().unwrap_or(Session::Lines(vec![])) {
            Session::Lines(lines) => to_reads(lines),
            Session::ReadError(lines) => {
                let mut reads = to_reads(lines);
                reads.push_back(Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged")));
                reads
            }
            Session::OpenFails => {
                return Err(AeagleError::SerialOpen {
                    port: "/dev/ttyACM0".to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such device"),
                });
            }
        };
        Ok(Box::new(ScriptedSource {
            lines,
            closed: self.closed.clone(),
        }))
    }
}
