//! Xbox 360 Chatpad Driver CLI
//!
//! Reads key reports from a chatpad wired to a serial port and turns them
//! into Linux key events.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use chatpad_driver::ChatpadConfig;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config, then apply command-line overrides
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ChatpadConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let mut config = ChatpadConfig::load(&config_path)?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }

    match cli.command {
        None => commands::run::run(config, false, None),
        Some(Commands::Run { no_inject, name }) => commands::run::run(config, no_inject, name),
        Some(Commands::Monitor {
            file,
            format,
            names,
        }) => commands::monitor::monitor(config, file, format, names),
        Some(Commands::Keymap) => commands::keymap::show(&config),
        Some(Commands::Config { force }) => commands::config::write(&config, &config_path, force),
    }
}
