//! Byte-stream transport boundary.
//!
//! The drivers only need a duplex byte stream. Anything implementing
//! `std::io::Read + std::io::Write` qualifies, including the serial port
//! returned by [`open_serial`].

use crate::{Error, Result};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tokio_serial::{DataBits, FlowControl, Parity, StopBits};

pub use tokio_serial::SerialPort;
use tracing::{debug, info};

/// Duplex byte stream used by the display drivers.
pub trait Transport {
    /// Writes every byte or fails. Does not wait for the bytes to drain.
    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Blocks until buffered output has been transmitted.
    fn flush(&mut self) -> std::io::Result<()>;

    /// Reads up to `n` bytes. Returns fewer on end of stream or timeout.
    fn read_up_to(&mut self, n: usize) -> std::io::Result<Vec<u8>>;
}

impl<T: Read + Write> Transport for T {
    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        Write::write_all(self, bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Write::flush(self)
    }

    fn read_up_to(&mut self, n: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match Read::read(self, &mut buf[filled..]) {
                Ok(0) => break,
                Ok(count) => filled += count,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

/// An open serial port usable as a [`Transport`].
pub type SerialTransport = Box<dyn SerialPort>;

/// Serial line settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud: u32,
    pub timeout: Duration,
    pub hardware_flow_control: bool,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud: 115_200,
            timeout: Duration::from_secs(1),
            hardware_flow_control: true,
        }
    }
}

/// Opens a serial port configured for the display (8N1).
pub fn open_serial(path: &str, settings: &SerialSettings) -> Result<SerialTransport> {
    let flow = if settings.hardware_flow_control {
        FlowControl::Hardware
    } else {
        FlowControl::None
    };

    let port = tokio_serial::new(path, settings.baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(flow)
        .timeout(settings.timeout)
        .open()
        .map_err(|e| {
            debug!("Failed to open {}: {}", path, e);
            if let tokio_serial::ErrorKind::Io(kind) = &e.kind {
                if (*kind == ErrorKind::NotFound || *kind == ErrorKind::PermissionDenied)
                    && !std::path::Path::new(path).exists()
                {
                    return Error::PortNotFound(path.to_string());
                }
            }
            if e.kind == tokio_serial::ErrorKind::NoDevice {
                return Error::PortNotFound(path.to_string());
            }
            Error::Serial(e)
        })?;

    info!(
        "Serial port opened: {} ({} baud, flow control {:?})",
        path, settings.baud, flow
    );
    Ok(port)
}
