//! 串口连接管理器
//!
//! Opens the target's serial port with mio-serial, drains stale output and
//! splits incoming bytes into lines.

use log::debug;
use mio_serial::SerialPort;
use std::io::{self, Read};
use std::time::{Duration, Instant};

use crate::config::serial_config::SerialConfig;
use crate::connection::{Connector, LineSource};
use crate::error::AeagleError;

const READ_CHUNK: usize = 4096;

/// Accumulates raw bytes and hands out complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Pops the next `\n`-terminated line, decoded lossily, without `\r\n`.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.pending.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw);
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Reads and drops bytes from `reader` until `window` passes or a read comes
/// back empty. Returns the number of bytes dropped.
fn drain_reader<R: Read + ?Sized>(reader: &mut R, window: Duration) -> io::Result<usize> {
    let deadline = Instant::now() + window;
    let mut buf = [0u8; READ_CHUNK];
    let mut discarded = 0;
    while Instant::now() < deadline {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => discarded += n,
            Err(e) if is_idle(&e) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(discarded)
}

/// 串口连接
pub struct SerialConnection {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
    buffer: LineBuffer,
}

impl SerialConnection {
    /// 打开串口（使用mio-serial）
    pub fn open(config: &SerialConfig) -> Result<Self, AeagleError> {
        let port = mio_serial::new(&config.port, config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| AeagleError::SerialOpen {
                port: config.port.clone(),
                source: e.into(),
            })?;
        debug!("Opened {} at {} baud", config.port, config.baud_rate);

        Ok(Self {
            port_name: config.port.clone(),
            port: Some(port),
            buffer: LineBuffer::new(),
        })
    }

    /// Discards whatever the target already sent, for at most `window`.
    pub fn drain(&mut self, window: Duration) -> io::Result<usize> {
        self.buffer.clear();
        let port = self.port_mut()?;
        let discarded = drain_reader(&mut **port, window)?;
        debug!("Drained {} stale bytes from {}", discarded, self.port_name);
        Ok(discarded)
    }

    fn port_mut(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Serial port not connected")) // 串口未连接
    }
}

impl LineSource for SerialConnection {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        if let Some(line) = self.buffer.next_line() {
            return Ok(Some(line));
        }

        let mut buf = [0u8; READ_CHUNK];
        let read = self.port_mut()?.read(&mut buf);
        match read {
            Ok(0) => Ok(None),
            Ok(n) => {
                self.buffer.push(&buf[..n]);
                Ok(self.buffer.next_line())
            }
            Err(e) if is_idle(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 关闭串口连接
    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("Closed {}", self.port_name);
        }
    }
}

/// Opens and drains the configured port once per job.
pub struct SerialConnector {
    config: SerialConfig,
}

impl SerialConnector {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }
}

impl Connector for SerialConnector {
    fn connect(&mut self) -> Result<Box<dyn LineSource>, AeagleError> {
        let mut connection = SerialConnection::open(&self.config)?;
        connection
            .drain(self.config.drain_window)
            .map_err(|source| AeagleError::SerialOpen {
                port: self.config.port.clone(),
                source,
            })?;
        Ok(Box::new(connection))
    }
}
