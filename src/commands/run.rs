//! Default command: feed chatpad keys into a virtual keyboard

use anyhow::{Context, Result};
use chatpad_driver::{ChatpadConfig, VirtualKeyboard};
use chatpad_keyboard::{ChatpadDriver, Dispatcher, Key, PlatformSink};
use chatpad_transport::SerialTransport;
use tracing::info;

use super::setup_interrupt_handler;

pub fn run(config: ChatpadConfig, no_inject: bool, name: Option<String>) -> Result<()> {
    let keymap = config.keymap()?;
    let transport = SerialTransport::open(&config.port, config.baud_rate)
        .with_context(|| format!("opening {}", config.port))?;

    let device_name = config
        .injection_device_name(name)
        .filter(|_| !no_inject);
    let platform = match device_name {
        None => {
            info!("Injection disabled, logging key changes only");
            let sink = PlatformSink::new(keymap, |pressed: &[Key], released: &[Key]| {
                info!("pressed {:?} released {:?}", pressed, released);
                Ok(())
            });
            Dispatcher::new().with_platform(sink)
        }
        Some(device_name) => {
            let mut keyboard = VirtualKeyboard::new(&device_name, &keymap)
                .context("creating uinput keyboard (is the uinput module loaded?)")?;
            match keyboard.device_path() {
                Some(path) => info!("Virtual keyboard '{}' at {}", device_name, path.display()),
                None => info!("Virtual keyboard '{}' created", device_name),
            }
            Dispatcher::new().with_platform(PlatformSink::injecting(keymap, keyboard))
        }
    };

    let mut driver = ChatpadDriver::new(transport, platform, config.driver_config());
    setup_interrupt_handler(driver.stop_handle());

    let stats = driver.run()?;
    if stats.sink_errors > 0 {
        info!("{} key changes could not be delivered", stats.sink_errors);
    }
    Ok(())
}
