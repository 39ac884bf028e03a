//! Virtual keyboard device using evdev/uinput
//!
//! Creates a virtual keyboard that appears to the system like any other
//! input device, so chatpad keys work in consoles, X11 and Wayland alike.

use chatpad_keyboard::{Key, KeyInjector, Keymap, SinkError};
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent,
};
use thiserror::Error;

/// Errors from virtual keyboard creation
#[derive(Debug, Error)]
pub enum UinputError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),
    #[error("Keymap is empty, nothing to register")]
    NoKeys,
}

/// Virtual keyboard device
pub struct VirtualKeyboard {
    device: VirtualDevice,
    /// Events queued since the last sync
    pending: Vec<InputEvent>,
}

impl VirtualKeyboard {
    /// Create a new virtual keyboard
    ///
    /// # Arguments
    /// * `name` - Device name (shown in `evtest` and `/proc/bus/input/devices`)
    /// * `keymap` - Every key in the table is registered with the device
    pub fn new(name: &str, keymap: &Keymap) -> Result<Self, UinputError> {
        if keymap.is_empty() {
            return Err(UinputError::NoKeys);
        }

        let mut keys = AttributeSet::<Key>::new();
        for key in keymap.keys() {
            keys.insert(key);
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(UinputError::CreateDevice)?
            .name(name)
            .with_keys(&keys)
            .map_err(UinputError::CreateDevice)?
            .build()
            .map_err(UinputError::CreateDevice)?;

        Ok(Self {
            device,
            pending: Vec::new(),
        })
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}

impl KeyInjector for VirtualKeyboard {
    fn write_key(&mut self, key: Key, is_down: bool) -> Result<(), SinkError> {
        self.pending.push(key_event(key, is_down));
        Ok(())
    }

    // `emit` appends the SYN_REPORT itself
    fn sync(&mut self) -> Result<(), SinkError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let events = std::mem::take(&mut self.pending);
        self.device.emit(&events).map_err(SinkError::Injection)
    }
}

fn key_event(key: Key, is_down: bool) -> InputEvent {
    InputEvent::new(EventType::KEY, key.code(), i32::from(is_down))
}
