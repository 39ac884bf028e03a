// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chatpad_driver::OutputFormat;

#[derive(Parser)]
#[command(name = "chatpad")]
#[command(author, version, about = "Xbox 360 chatpad serial driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/chatpad/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Serial port, overrides the config file
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Baud rate, overrides the config file
    #[arg(long, global = true)]
    pub baud: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inject chatpad keys through a virtual uinput keyboard (default)
    Run {
        /// Decode and log key changes without creating the uinput device
        #[arg(long)]
        no_inject: bool,

        /// Virtual device name, overrides the config file
        #[arg(long)]
        name: Option<String>,
    },

    /// Print key changes as scan codes
    #[command(visible_aliases = ["mon", "m"])]
    Monitor {
        /// Replay a raw serial capture instead of opening the port
        #[arg(long = "file", value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Annotate scan codes with the keys they map to
        #[arg(long)]
        names: bool,
    },

    /// Show the effective scan code → key table
    #[command(visible_alias = "k")]
    Keymap,

    /// Write the effective settings to the config file
    Config {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
