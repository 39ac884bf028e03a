//! Scan code → Linux input key lookup
//!
//! The chatpad's scan codes follow its physical matrix (row in the high
//! nibble), so they bear no relation to evdev codes. The built-in table
//! covers every key on the standard US layout; the modifier ids map to keys
//! that desktop environments already treat as modifiers.

use std::collections::BTreeMap;

use evdev::Key;

use crate::error::{KeymapError, SinkError};
use crate::state::ScanCode;

/// Default chatpad layout
pub static BUILTIN_KEYMAP: &[(ScanCode, Key)] = &[
    // Synthetic modifiers
    (1, Key::KEY_LEFTSHIFT),  // Shift
    (2, Key::KEY_LEFTCTRL),   // Green square
    (3, Key::KEY_RIGHTALT),   // Orange circle
    (4, Key::KEY_LEFTMETA),   // People
    // Number row
    (23, Key::KEY_1),
    (22, Key::KEY_2),
    (21, Key::KEY_3),
    (20, Key::KEY_4),
    (19, Key::KEY_5),
    (18, Key::KEY_6),
    (17, Key::KEY_7),
    (103, Key::KEY_8),
    (102, Key::KEY_9),
    (101, Key::KEY_0),
    // Top letter row
    (39, Key::KEY_Q),
    (38, Key::KEY_W),
    (37, Key::KEY_E),
    (36, Key::KEY_R),
    (35, Key::KEY_T),
    (34, Key::KEY_Y),
    (33, Key::KEY_U),
    (118, Key::KEY_I),
    (117, Key::KEY_O),
    (100, Key::KEY_P),
    // Home row
    (55, Key::KEY_A),
    (54, Key::KEY_S),
    (53, Key::KEY_D),
    (52, Key::KEY_F),
    (51, Key::KEY_G),
    (50, Key::KEY_H),
    (49, Key::KEY_J),
    (119, Key::KEY_K),
    (114, Key::KEY_L),
    (98, Key::KEY_COMMA),
    // Bottom row
    (70, Key::KEY_Z),
    (69, Key::KEY_X),
    (68, Key::KEY_C),
    (67, Key::KEY_V),
    (66, Key::KEY_B),
    (65, Key::KEY_N),
    (82, Key::KEY_M),
    (83, Key::KEY_DOT),
    (99, Key::KEY_ENTER),
    (113, Key::KEY_BACKSPACE),
    (85, Key::KEY_LEFT),
    (84, Key::KEY_SPACE),
    (81, Key::KEY_RIGHT),
];

/// Parse an evdev key name. Accepts `KEY_A` as well as the bare `A`.
pub fn parse_key_name(name: &str) -> Result<Key, KeymapError> {
    let name = name.trim();
    let full = if name.starts_with("KEY_") || name.starts_with("BTN_") {
        name.to_string()
    } else {
        format!("KEY_{}", name.to_ascii_uppercase())
    };
    full.parse::<Key>()
        .map_err(|_| KeymapError::UnknownKeyName(name.to_string()))
}

/// Scan code → platform key table. Built once at startup and read-only
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    entries: BTreeMap<ScanCode, Key>,
}

impl Keymap {
    /// Table with no entries; every lookup fails
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_KEYMAP.iter().copied().collect(),
        }
    }

    /// Add or replace entries from `(scan code, key name)` pairs
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Result<Self, KeymapError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (code, name) in overrides {
            let code: ScanCode = code
                .trim()
                .parse()
                .ok()
                .filter(|&c| c != 0)
                .ok_or_else(|| KeymapError::InvalidScanCode(code.to_string()))?;
            let key = parse_key_name(name)?;
            self.entries.insert(code, key);
        }
        Ok(self)
    }

    pub fn insert(&mut self, code: ScanCode, key: Key) -> Option<Key> {
        self.entries.insert(code, key)
    }

    pub fn get(&self, code: ScanCode) -> Option<Key> {
        self.entries.get(&code).copied()
    }

    /// Look up a scan code, failing if the table has no entry for it
    pub fn translate(&self, code: ScanCode) -> Result<Key, SinkError> {
        self.get(code).ok_or(SinkError::UnknownScanCode(code))
    }

    /// Translate every code, failing on the first unmapped one
    pub fn translate_all(&self, codes: &[ScanCode]) -> Result<Vec<Key>, SinkError> {
        codes.iter().map(|&code| self.translate(code)).collect()
    }

    /// Entries in scan code order
    pub fn iter(&self) -> impl Iterator<Item = (ScanCode, Key)> + '_ {
        self.entries.iter().map(|(&code, &key)| (code, key))
    }

    /// Every key the table can produce
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries.values().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
