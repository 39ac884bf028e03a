//! Key handling for the Xbox 360 chatpad
//!
//! This crate turns decoded chatpad frames into key press/release events
//! and keeps the device awake, on top of any `chatpad-transport` backend.
//!
//! # Example
//!
//! ```ignore
//! use chatpad_keyboard::{ChatpadDriver, Dispatcher, DriverConfig, Keymap, PlatformSink};
//! use chatpad_transport::SerialTransport;
//!
//! let transport = SerialTransport::open("/dev/ttyAMA0", 19200)?;
//! let dispatcher = Dispatcher::new()
//!     .with_platform(PlatformSink::new(Keymap::builtin(), |pressed: &[_], released: &[_]| {
//!         println!("{:?} {:?}", pressed, released);
//!         Ok(())
//!     }));
//! let mut driver = ChatpadDriver::new(transport, dispatcher, DriverConfig::default());
//! driver.run()?;
//! ```

pub mod driver;
pub mod error;
pub mod keepalive;
pub mod keymap;
pub mod sink;
pub mod state;

pub use driver::{ChatpadDriver, DriverConfig, DriverStats, StopHandle, DEFAULT_POLL_INTERVAL};
pub use error::{DriverError, KeymapError, SinkError};
pub use keepalive::{Keepalive, DEFAULT_KEEPALIVE_TICKS};
pub use keymap::{parse_key_name, Keymap, BUILTIN_KEYMAP};
pub use sink::{
    Dispatcher, EventSink, Injecting, KeyInjector, NoopSink, PlatformConsumer, PlatformSink,
    RawSink,
};
pub use state::{
    KeyChange, KeyDirection, KeyEvent, KeyState, KeyStateTracker, ScanCode, MAX_ACTIVE_KEYS,
};

// Platform key type used by the keymap and sinks
pub use evdev::Key;
