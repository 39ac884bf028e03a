//! Print key changes as they are decoded

use std::path::PathBuf;

use anyhow::{Context, Result};
use chatpad_driver::{ChatpadConfig, EventPrinter, OutputFormat};
use chatpad_keyboard::{ChatpadDriver, Dispatcher, RawSink, ScanCode, SinkError};
use chatpad_transport::{BoxedTransport, MemoryTransport, SerialTransport};
use tracing::info;

use super::setup_interrupt_handler;

pub fn monitor(
    config: ChatpadConfig,
    file: Option<PathBuf>,
    format: OutputFormat,
    names: bool,
) -> Result<()> {
    let keymap = if names { Some(config.keymap()?) } else { None };
    let mut printer = EventPrinter::new(std::io::stdout(), format, keymap);
    let sink = RawSink::new(move |pressed: &[ScanCode], released: &[ScanCode]| {
        printer.print(pressed, released).map_err(SinkError::Io)
    });
    let dispatcher = Dispatcher::new().with_raw(sink);

    let replay = file.is_some();
    let transport: BoxedTransport = match file {
        Some(path) => Box::new(
            MemoryTransport::from_file(&path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        None => Box::new(
            SerialTransport::open(&config.port, config.baud_rate)
                .with_context(|| format!("opening {}", config.port))?,
        ),
    };

    let mut driver = ChatpadDriver::new(transport, dispatcher, config.driver_config());
    if replay {
        let stats = driver.replay()?;
        info!(
            "Replayed {} frames ({} key changes, {} bytes discarded)",
            stats.frames, stats.dispatches, stats.discarded_bytes
        );
    } else {
        setup_interrupt_handler(driver.stop_handle());
        driver.run()?;
    }
    Ok(())
}
