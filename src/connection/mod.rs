//! 串口连接管理模块
//!
//! Line-oriented access to the target's serial output. The capture state
//! machine only sees [`LineSource`], so it can be driven by a real port or by
//! a scripted source in tests.

use crate::error::AeagleError;
use std::io;

/// Source of text lines coming from the target.
pub trait LineSource {
    /// Reads the next complete line without its line terminator.
    ///
    /// Returns `Ok(None)` when no complete line arrived within the per-read
    /// timeout. Any `Err` is a connection-level failure.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// 关闭连接
    fn close(&mut self) {}
}

/// Opens a fresh, drained connection for each job.
pub trait Connector {
    fn connect(&mut self) -> Result<Box<dyn LineSource>, AeagleError>;
}

mod serial;
pub use serial::{LineBuffer, SerialConnection, SerialConnector};
