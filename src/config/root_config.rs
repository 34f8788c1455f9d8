//! Represents the root configuration for the application.
//!
//! Loaded with `utils::read_toml_from_file`. Every field has a default, so a
//! config file only needs to list what differs from the stock bench:
//!
//! ```toml
//! retry_delay = "2s"
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! capture_timeout = "45s"
//!
//! [[suites]]
//! name = "riot-tlsf"
//! demo = "demo-riot"
//! retries = 1
//! ```
use crate::config::cli_args::CliArgs;
use crate::config::serial_config::SerialConfig;
use crate::config::suite_config::{self, FamilyConfig, SuiteConfig};
use crate::utils;
use anyhow::Result;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "aeagle.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project root every relative path below is resolved against.
    #[serde(skip)]
    pub root: PathBuf,
    pub tests_dir: PathBuf,
    pub apps_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Flashing script at the root of each demo project.
    pub flash_script: String,
    /// Entry file the demo build treats as its program entry point.
    pub entry_file: String,
    pub source_extension: String,
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
    /// Demo projects whose entry file sits at the project root instead of `src/`.
    pub root_entry_demos: Vec<String>,
    /// Record-type tags; a record line starts with `<TAG>,`.
    pub record_tags: Vec<String>,
    pub serial: SerialConfig,
    pub suites: Vec<SuiteConfig>,
    pub families: Vec<FamilyConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tests_dir: PathBuf::from("tests"),
            apps_dir: PathBuf::from("apps"),
            results_dir: PathBuf::from("results/reports"),
            flash_script: String::from("flash.sh"),
            entry_file: String::from("main.c"),
            source_extension: String::from("c"),
            retry_delay: Duration::from_secs(1),
            root_entry_demos: vec![String::from("demo-freertos"), String::from("demo-contiki")],
            record_tags: ["META", "SNAP", "TIME", "FAULT", "EXHAUSTED", "LEAK", "NOLEAK"]
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            serial: SerialConfig::default(),
            suites: suite_config::default_suites(),
            families: suite_config::default_families(),
        }
    }
}

impl Config {
    /// 从文件中读取
    pub fn from_file(path: &Path) -> Result<Self> {
        utils::read_toml_from_file(path)
    }

    /// Loads the configuration for a project root.
    ///
    /// An explicit file must exist; otherwise `<root>/aeagle.toml` is used when
    /// present and the built-in defaults when not.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = root.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    debug!("No {} in {}, using built-in defaults", DEFAULT_CONFIG_FILE, root.display());
                    Self::default()
                }
            }
        };
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Applies command line overrides on top of the loaded values.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(ref port) = args.port {
            self.serial.port = port.clone();
        }
        if let Some(baud) = args.baud {
            self.serial.baud_rate = baud;
        }
        if let Some(secs) = args.timeout {
            self.serial.capture_timeout = Duration::from_secs(secs);
        }
    }

    pub fn tests_path(&self) -> PathBuf {
        self.root.join(&self.tests_dir)
    }

    pub fn apps_path(&self) -> PathBuf {
        self.root.join(&self.apps_dir)
    }

    pub fn results_path(&self) -> PathBuf {
        self.root.join(&self.results_dir)
    }
}
