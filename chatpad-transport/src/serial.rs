//! Serial port transport
//!
//! The chatpad talks plain UART (3.3V TTL) and is usually wired to a
//! Raspberry Pi's `/dev/ttyAMA0` or a USB-serial adapter.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Per-call read timeout. Reads are retried until the buffer is full, the
/// timeout only bounds a single blocking syscall.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial port transport
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    info: TransportDeviceInfo,
}

impl SerialTransport {
    /// Open `path` at `baud_rate` (8N1, no flow control)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        info!("Opened serial port {} at {} baud", path, baud_rate);

        Ok(Self {
            port: Some(port),
            info: TransportDeviceInfo::serial(path, baud_rate),
        })
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, TransportError> {
        self.port.as_mut().ok_or(TransportError::Closed)
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        let pending = self.port_mut()?.bytes_to_read()?;
        Ok(pending as usize)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let port = self.port_mut()?;
        let mut filled = 0;
        while filled < buf.len() {
            match port.read(&mut buf[filled..]) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => filled += n,
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let port = self.port_mut()?;
        port.write_all(data)?;
        port.flush()?;
        Ok(())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.port.take().is_some() {
            debug!("Closed serial port {}", self.info.device_path);
        }
        Ok(())
    }
}
