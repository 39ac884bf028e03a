//! Key report framing
//!
//! The chatpad streams 8-byte key reports with no length prefix or
//! delimiter, so the reader hunts for the two sync markers byte by byte
//! and then pulls the rest of the frame in one read.

use bitflags::bitflags;
use tracing::trace;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::TransportError;
use crate::protocol::{FRAME_LEN, SYNC_MARKER_1, SYNC_MARKER_2};
use crate::Transport;

bitflags! {
    /// Modifier bits of byte 3. The upper nibble carries no meaning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierMask: u8 {
        const SHIFT = 1 << 0;
        const GREEN_SQUARE = 1 << 1;
        const ORANGE_CIRCLE = 1 << 2;
        const PEOPLE = 1 << 3;
    }
}

/// Synthetic modifier keys, reported alongside real scan codes as ids 1-4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Modifier {
    Shift = 1,
    GreenSquare = 2,
    OrangeCircle = 3,
    /// The "people" / guide key
    People = 4,
}

impl Modifier {
    /// All modifiers in ascending id order
    pub const ALL: [Modifier; 4] = [
        Modifier::Shift,
        Modifier::GreenSquare,
        Modifier::OrangeCircle,
        Modifier::People,
    ];

    /// Synthetic scan code used for this modifier
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Mask bit that reports this modifier
    pub fn mask(self) -> ModifierMask {
        match self {
            Modifier::Shift => ModifierMask::SHIFT,
            Modifier::GreenSquare => ModifierMask::GREEN_SQUARE,
            Modifier::OrangeCircle => ModifierMask::ORANGE_CIRCLE,
            Modifier::People => ModifierMask::PEOPLE,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Modifier::Shift => "Shift",
            Modifier::GreenSquare => "GreenSquare",
            Modifier::OrangeCircle => "OrangeCircle",
            Modifier::People => "People",
        }
    }
}

impl ModifierMask {
    /// Modifiers set in this mask, ascending by id
    pub fn modifiers(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(move |m| self.contains(m.mask()))
    }
}

/// One 8-byte key report as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct RawFrame {
    sync: [u8; 2],
    _reserved0: u8,
    modifiers: u8,
    key0: u8,
    key1: u8,
    _reserved1: [u8; 2],
}

impl RawFrame {
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        zerocopy::transmute!(bytes)
    }

    /// Build a well-formed report (reserved bytes zeroed)
    pub fn new(modifiers: u8, key0: u8, key1: u8) -> Self {
        Self {
            sync: [SYNC_MARKER_1, SYNC_MARKER_2],
            _reserved0: 0,
            modifiers,
            key0,
            key1,
            _reserved1: [0; 2],
        }
    }

    pub fn has_sync_markers(&self) -> bool {
        self.sync == [SYNC_MARKER_1, SYNC_MARKER_2]
    }

    /// Extract the modifier byte and both key slots.
    ///
    /// Reserved and checksum bytes are not inspected.
    pub fn decode(&self) -> DecodedFrame {
        DecodedFrame {
            modifiers: self.modifiers,
            key0: self.key0,
            key1: self.key1,
        }
    }

    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        zerocopy::transmute!(*self)
    }
}

/// Payload of a key report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodedFrame {
    /// Raw modifier byte (byte 3)
    pub modifiers: u8,
    /// Scan code in slot 0, 0 when empty
    pub key0: u8,
    /// Scan code in slot 1, 0 when empty
    pub key1: u8,
}

impl DecodedFrame {
    pub fn modifier_mask(&self) -> ModifierMask {
        ModifierMask::from_bits_truncate(self.modifiers)
    }

    /// Non-empty key slots in slot order
    pub fn keys(&self) -> impl Iterator<Item = u8> {
        [self.key0, self.key1].into_iter().filter(|&k| k != 0)
    }
}

/// Counters kept by [`FrameReader`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Complete frames returned
    pub frames: u64,
    /// Bytes thrown away while hunting for sync markers
    pub discarded_bytes: u64,
}

/// Locates key reports in the inbound byte stream.
///
/// Synchronization is only attempted while at least one full frame worth of
/// bytes is buffered, so a partially received frame is left alone until the
/// rest arrives.
///
/// When the first marker matches but the second does not, both bytes are
/// dropped. A `B4` arriving in the second position is therefore never
/// reconsidered as a frame start, so `B4 B4 C5 ..` loses that frame.
#[derive(Debug, Default)]
pub struct FrameReader {
    stats: SyncStats,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Return the next complete frame, or `None` when fewer than
    /// [`FRAME_LEN`] bytes are buffered.
    pub fn next_frame<T>(&mut self, transport: &mut T) -> Result<Option<RawFrame>, TransportError>
    where
        T: Transport + ?Sized,
    {
        let mut byte = [0u8; 1];
        loop {
            if transport.bytes_available()? < FRAME_LEN {
                return Ok(None);
            }

            transport.read_exact(&mut byte)?;
            if byte[0] != SYNC_MARKER_1 {
                trace!("Skipping byte {:02X} while looking for sync", byte[0]);
                self.stats.discarded_bytes += 1;
                continue;
            }

            transport.read_exact(&mut byte)?;
            if byte[0] != SYNC_MARKER_2 {
                trace!("Bad second sync byte {:02X}, resyncing", byte[0]);
                self.stats.discarded_bytes += 2;
                continue;
            }

            let mut buf = [0u8; FRAME_LEN];
            buf[0] = SYNC_MARKER_1;
            buf[1] = SYNC_MARKER_2;
            transport.read_exact(&mut buf[2..])?;
            self.stats.frames += 1;
            trace!("Frame: {:02X?}", buf);
            return Ok(Some(RawFrame::from_bytes(buf)));
        }
    }
}
