//! Key state tracking
//!
//! The chatpad reports its full state (modifier mask plus up to two held
//! keys) in every frame and repeats frames freely. [`KeyStateTracker`] keeps
//! the last state it saw and turns each new one into press/release lists.

use chatpad_transport::{DecodedFrame, Modifier, ModifierMask};
use serde::Serialize;

/// Raw chatpad key identifier. Ids 1-4 are the synthetic modifier keys.
pub type ScanCode = u8;

/// The chatpad has 2-key rollover on top of the modifiers
pub const MAX_ACTIVE_KEYS: usize = 2;

/// Direction of a single key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyDirection {
    Pressed,
    Released,
}

/// A single key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyEvent {
    pub code: ScanCode,
    pub direction: KeyDirection,
}

/// Keys that went down and up between two consecutive distinct frames.
///
/// Within each list real keys come first (slot order), then modifiers in
/// ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyChange {
    pub pressed: Vec<ScanCode>,
    pub released: Vec<ScanCode>,
}

impl KeyChange {
    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty() && self.released.is_empty()
    }

    /// Flatten into individual events, presses before releases
    pub fn events(&self) -> impl Iterator<Item = KeyEvent> + '_ {
        let pressed = self.pressed.iter().map(|&code| KeyEvent {
            code,
            direction: KeyDirection::Pressed,
        });
        let released = self.released.iter().map(|&code| KeyEvent {
            code,
            direction: KeyDirection::Released,
        });
        pressed.chain(released)
    }
}

/// Keys and modifiers held according to one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    /// Never contains 0, at most [`MAX_ACTIVE_KEYS`] entries
    keys: Vec<ScanCode>,
    modifiers: ModifierMask,
}

impl KeyState {
    /// State described by a frame.
    ///
    /// A frame reporting the same nonzero code in both slots holds that key
    /// once.
    pub fn from_frame(frame: &DecodedFrame) -> Self {
        let mut keys = Vec::with_capacity(MAX_ACTIVE_KEYS);
        for code in frame.keys() {
            if !keys.contains(&code) {
                keys.push(code);
            }
        }
        Self {
            keys,
            modifiers: frame.modifier_mask(),
        }
    }

    pub fn active_keys(&self) -> &[ScanCode] {
        &self.keys
    }

    pub fn active_modifiers(&self) -> impl Iterator<Item = Modifier> {
        self.modifiers.modifiers()
    }

    pub fn modifier_mask(&self) -> ModifierMask {
        self.modifiers
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.modifiers.is_empty()
    }

    /// Same keys (in any slot order) and same modifiers
    fn same_as(&self, other: &KeyState) -> bool {
        self.modifiers == other.modifiers
            && self.keys.len() == other.keys.len()
            && self.keys.iter().all(|k| other.keys.contains(k))
    }

    /// Transition from `self` to `next`
    fn diff(&self, next: &KeyState) -> KeyChange {
        let mut pressed: Vec<ScanCode> = next
            .keys
            .iter()
            .filter(|k| !self.keys.contains(k))
            .copied()
            .collect();
        pressed.extend(
            next.modifiers
                .difference(self.modifiers)
                .modifiers()
                .map(Modifier::id),
        );

        let mut released: Vec<ScanCode> = self
            .keys
            .iter()
            .filter(|k| !next.keys.contains(k))
            .copied()
            .collect();
        released.extend(
            self.modifiers
                .difference(next.modifiers)
                .modifiers()
                .map(Modifier::id),
        );

        KeyChange { pressed, released }
    }
}

/// Diffs successive frames against the previously reported state
#[derive(Debug, Default)]
pub struct KeyStateTracker {
    previous: KeyState,
    duplicates: u64,
}

impl KeyStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last distinct state seen
    pub fn state(&self) -> &KeyState {
        &self.previous
    }

    /// Frames skipped because they repeated the current state
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Apply a frame. Returns `None` for a repeat of the current state,
    /// leaving the state untouched.
    pub fn update(&mut self, frame: &DecodedFrame) -> Option<KeyChange> {
        let current = KeyState::from_frame(frame);
        if current.same_as(&self.previous) {
            self.duplicates += 1;
            return None;
        }
        let change = self.previous.diff(&current);
        self.previous = current;
        Some(change)
    }

    /// Forget everything held, returning the releases needed to get there
    pub fn release_all(&mut self) -> Option<KeyChange> {
        if self.previous.is_empty() {
            return None;
        }
        let empty = KeyState::default();
        let change = self.previous.diff(&empty);
        self.previous = empty;
        Some(change)
    }
}
