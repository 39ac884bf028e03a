//! Command handlers for the CLI application.
//!
//! - `run`: drive the chatpad and inject keys (the default command)
//! - `monitor`: print key changes from the port or a capture file
//! - `keymap`: show the effective key table
//! - `config`: write a default configuration file

pub mod config;
pub mod keymap;
pub mod monitor;
pub mod run;

use chatpad_keyboard::StopHandle;
use tracing::{info, warn};

/// Stop the driver loop on Ctrl-C.
pub fn setup_interrupt_handler(stop: StopHandle) {
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Interrupted, shutting down");
        stop.stop();
    }) {
        warn!("Could not set Ctrl+C handler: {}", e);
    }
}
