// Xbox 360 chatpad Linux driver - shared library
// Configuration, uinput injection and event output for the `chatpad` binary

pub mod config;
pub mod output;
pub mod uinput;

pub use config::ChatpadConfig;
pub use output::{EventPrinter, OutputFormat};
pub use uinput::{UinputError, VirtualKeyboard};
