//! Error types for aeagle
//!
//! Configuration errors abort the run before any job starts. Resolution and
//! serial errors only fail the job they occur in.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AeagleError {
    // === Configuration Errors ===
    #[error("Unknown suite '{name}'. Supported: {supported}")]
    UnknownSuite { name: String, supported: String },

    #[error("Specify at least --os or --test")]
    InvalidArguments,

    #[error("No tests found in {}", .0.display())]
    NoTestsFound(PathBuf),

    #[error("No suite contains test '{0}'")]
    NoMatchingSuite(String),

    // === Per-job Errors ===
    #[error("{what} not found: {}", path.display())]
    PathResolution { what: &'static str, path: PathBuf },

    #[error("Could not open serial port {port}: {source}")]
    SerialOpen {
        port: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
