//! Chatpad wire protocol constants
//!
//! Outbound messages are fixed 5-byte commands. Inbound key reports are
//! 8-byte frames:
//!
//! ```text
//! Byte 0-1: Sync markers (B4 C5)
//! Byte 2:   Reserved
//! Byte 3:   Modifier bitmask (low 4 bits)
//! Byte 4:   Key slot 0 scan code (0 = empty)
//! Byte 5:   Key slot 1 scan code (0 = empty)
//! Byte 6-7: Reserved
//! ```
//!
//! The trailing bytes carry a checksum on real hardware. It is not verified.

/// Default line speed of the chatpad UART
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// Sent once after opening the port
pub const INIT_MESSAGE: [u8; 5] = [0x87, 0x02, 0x8C, 0x1F, 0xCC];

/// Sent at startup and periodically, otherwise the chatpad stops reporting
pub const AWAKE_MESSAGE: [u8; 5] = [0x87, 0x02, 0x8C, 0x1B, 0xD0];

/// First byte of every key report
pub const SYNC_MARKER_1: u8 = 0xB4;

/// Second byte of every key report
pub const SYNC_MARKER_2: u8 = 0xC5;

/// Length of a key report frame in bytes
pub const FRAME_LEN: usize = 8;

/// Byte offsets inside a key report frame
pub mod offset {
    pub const MODIFIERS: usize = 3;
    pub const KEY0: usize = 4;
    pub const KEY1: usize = 5;
}
