//! Transport abstraction layer for Xbox 360 chatpad communication
//!
//! This crate provides the byte-level plumbing the driver sits on:
//!
//! - A duplex byte [`Transport`] trait with a serial backend
//!   ([`SerialTransport`]) and an in-memory backend ([`MemoryTransport`])
//!   used for capture replay and tests
//! - Wire protocol constants (sync markers, init/awake messages)
//! - Frame synchronization and decoding of the 8-byte key report

pub mod error;
pub mod frame;
pub mod protocol;
pub mod types;

mod memory;
mod serial;

pub use error::TransportError;
pub use frame::{DecodedFrame, FrameReader, Modifier, ModifierMask, RawFrame, SyncStats};
pub use memory::{MemoryFeed, MemoryTransport, WriteLog};
pub use serial::SerialTransport;
pub use types::{TransportDeviceInfo, TransportType};

/// The core transport trait - all backends implement this
///
/// Reads and writes are blocking and exact-count: a call returns once the
/// whole buffer has been transferred or the backend has failed.
pub trait Transport: Send {
    /// Number of inbound bytes buffered and readable without blocking
    fn bytes_available(&mut self) -> Result<usize, TransportError>;

    /// Fill `buf` completely, blocking until enough bytes have arrived
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Write all of `data` to the device
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Check if the transport is still open
    fn is_open(&self) -> bool;

    /// Close the transport. Further reads and writes fail with
    /// [`TransportError::Closed`].
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Type alias for a boxed transport
pub type BoxedTransport = Box<dyn Transport>;

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        (**self).bytes_available()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(data)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        (**self).device_info()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}
