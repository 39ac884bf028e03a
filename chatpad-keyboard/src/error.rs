//! Driver error types

use chatpad_transport::TransportError;
use thiserror::Error;

use crate::state::ScanCode;

/// Errors raised while delivering key changes to a sink
#[derive(Error, Debug)]
pub enum SinkError {
    /// The keymap has no platform key for this scan code
    #[error("No platform key mapped for scan code {0}")]
    UnknownScanCode(ScanCode),

    /// Writing to the input injection device failed
    #[error("Key injection failed: {0}")]
    Injection(#[source] std::io::Error),

    /// Generic output failure (diagnostic sinks)
    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from building a keymap
#[derive(Error, Debug)]
pub enum KeymapError {
    #[error("Unknown key name: {0}")]
    UnknownKeyName(String),

    #[error("Invalid scan code: {0}")]
    InvalidScanCode(String),
}

/// Errors that stop the driver loop
#[derive(Error, Debug)]
pub enum DriverError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Sink failure (only fatal with strict keymap handling)
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}
