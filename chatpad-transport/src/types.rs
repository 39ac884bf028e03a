//! Common types for transport layer

/// Transport type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// UART / USB-serial adapter
    Serial,
    /// In-memory byte stream (capture replay, tests)
    Memory,
}

/// Device identification information
#[derive(Debug, Clone)]
pub struct TransportDeviceInfo {
    /// Transport type
    pub transport_type: TransportType,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Line speed, if the transport has one
    pub baud_rate: Option<u32>,
}

impl TransportDeviceInfo {
    pub fn serial(path: &str, baud_rate: u32) -> Self {
        Self {
            transport_type: TransportType::Serial,
            device_path: path.to_string(),
            baud_rate: Some(baud_rate),
        }
    }

    pub fn memory(label: &str) -> Self {
        Self {
            transport_type: TransportType::Memory,
            device_path: label.to_string(),
            baud_rate: None,
        }
    }
}
