//! In-memory transport
//!
//! Serves inbound bytes from a shared buffer and records everything written.
//! Used to replay captured serial streams and to drive the decoder in tests.
//! There is no producer behind the buffer, so a read that cannot be satisfied
//! from what is queued reports [`TransportError::Disconnected`] instead of
//! blocking.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Handle for appending inbound bytes while the transport is owned elsewhere
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed(Arc<Mutex<VecDeque<u8>>>);

impl MemoryFeed {
    pub fn push(&self, bytes: &[u8]) {
        self.0.lock().extend(bytes.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Handle for inspecting outbound bytes
#[derive(Debug, Clone, Default)]
pub struct WriteLog(Arc<Mutex<Vec<u8>>>);

impl WriteLog {
    /// Everything written so far
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    /// Number of non-overlapping occurrences of `message` in the log
    pub fn count(&self, message: &[u8]) -> usize {
        if message.is_empty() {
            return 0;
        }
        let log = self.0.lock();
        let mut count = 0;
        let mut i = 0;
        while i + message.len() <= log.len() {
            if &log[i..i + message.len()] == message {
                count += 1;
                i += message.len();
            } else {
                i += 1;
            }
        }
        count
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Transport backed by memory buffers
pub struct MemoryTransport {
    input: MemoryFeed,
    written: WriteLog,
    info: TransportDeviceInfo,
    open: bool,
}

impl MemoryTransport {
    /// Create a transport whose inbound stream starts with `input`
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        let feed = MemoryFeed::default();
        feed.push(&input.into());
        Self {
            input: feed,
            written: WriteLog::default(),
            info: TransportDeviceInfo::memory("memory"),
            open: true,
        }
    }

    /// Replay a raw serial capture from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("Loaded {} bytes from {}", bytes.len(), path.display());
        let mut transport = Self::new(bytes);
        transport.info = TransportDeviceInfo::memory(&path.display().to_string());
        Ok(transport)
    }

    pub fn feed(&self) -> MemoryFeed {
        self.input.clone()
    }

    pub fn write_log(&self) -> WriteLog {
        self.written.clone()
    }
}

impl Transport for MemoryTransport {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        Ok(self.input.len())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        let mut input = self.input.0.lock();
        if input.len() < buf.len() {
            return Err(TransportError::Disconnected);
        }
        let len = buf.len();
        for (dst, src) in buf.iter_mut().zip(input.drain(..len)) {
            *dst = src;
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        self.written.0.lock().extend_from_slice(data);
        Ok(())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_consumes_in_order() {
        let mut transport = MemoryTransport::new(vec![1, 2, 3, 4]);
        let mut buf = [0u8; 3];
        transport.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(transport.bytes_available().unwrap(), 1);
    }

    #[test]
    fn test_short_read_is_disconnect() {
        let mut transport = MemoryTransport::new(vec![1]);
        let mut buf = [0u8; 2];
        assert!(matches!(
            transport.read_exact(&mut buf),
            Err(TransportError::Disconnected)
        ));
        // Nothing consumed on failure
        assert_eq!(transport.bytes_available().unwrap(), 1);
    }

    #[test]
    fn test_write_log_counts_messages() {
        let mut transport = MemoryTransport::new(Vec::new());
        let log = transport.write_log();
        transport.write_all(&[0xAA, 0xBB]).unwrap();
        transport.write_all(&[0x00]).unwrap();
        transport.write_all(&[0xAA, 0xBB]).unwrap();
        assert_eq!(log.count(&[0xAA, 0xBB]), 2);
        assert_eq!(log.bytes(), vec![0xAA, 0xBB, 0x00, 0xAA, 0xBB]);
    }

    #[test]
    fn test_closed_transport_rejects_io() {
        let mut transport = MemoryTransport::new(vec![1, 2]);
        transport.close().unwrap();
        assert!(!transport.is_open());
        assert!(matches!(
            transport.bytes_available(),
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            transport.write_all(&[0]),
            Err(TransportError::Closed)
        ));
    }

    #[test]
    fn test_feed_appends_while_owned() {
        let transport = MemoryTransport::new(vec![1]);
        let feed = transport.feed();
        let mut boxed: Box<dyn Transport> = Box::new(transport);
        feed.push(&[2, 3]);
        assert_eq!(boxed.bytes_available().unwrap(), 3);
    }
}
