//! Configuration types for aeagle.
//!
//! Built-in defaults describe the stock bench (suites, demo projects, serial
//! settings). An optional TOML file and the command line can override them.

pub mod cli_args;
pub mod root_config;
pub mod serial_config;
pub mod suite_config;

pub use cli_args::CliArgs;
pub use root_config::Config;
pub use serial_config::SerialConfig;
pub use suite_config::{FamilyConfig, SuiteConfig};
