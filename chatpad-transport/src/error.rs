//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Serial port not found: {0}")]
    PortNotFound(String),

    #[error("Serial port permission denied: {0}")]
    PermissionDenied(String),

    #[error("Serial error: {0}")]
    Serial(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream ended (device unplugged or replay exhausted)
    #[error("Device disconnected")]
    Disconnected,

    #[error("Transport closed")]
    Closed,
}

impl From<serialport::Error> for TransportError {
    fn from(e: serialport::Error) -> Self {
        use serialport::ErrorKind;

        let msg = e.to_string();
        match e.kind() {
            ErrorKind::NoDevice => TransportError::PortNotFound(msg),
            ErrorKind::Io(std::io::ErrorKind::NotFound) => TransportError::PortNotFound(msg),
            ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                TransportError::PermissionDenied(msg)
            }
            _ => TransportError::Serial(msg),
        }
    }
}
