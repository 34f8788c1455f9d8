//! aeagle deploys C test fixtures onto embedded targets, flashes them and
//! captures the structured results they print on the serial console.
//!
//! Pipeline per job: [`jobs`] expands the selection, [`connection`] opens and
//! drains the port, [`flash`] swaps the test into the demo project and runs the
//! flash tool, [`capture`] watches the serial output and [`reporter`] writes the
//! records. [`runner`] ties them together and [`summary`] aggregates outcomes.

pub mod capture;
pub mod config;
pub mod connection;
pub mod error;
pub mod flash;
pub mod jobs;
pub mod registry;
pub mod reporter;
pub mod runner;
pub mod summary;
pub mod utils;
