//! Driver configuration
//!
//! Stored as TOML, by default at `~/.config/chatpad/config.toml`. A missing
//! file means defaults. Keymap overrides are keyed by scan code:
//!
//! ```toml
//! port = "/dev/ttyUSB0"
//!
//! [keymap]
//! "4" = "KEY_LEFTALT"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chatpad_keyboard::{DriverConfig, Keymap, DEFAULT_KEEPALIVE_TICKS};
use chatpad_transport::protocol::DEFAULT_BAUD_RATE;
use serde::{Deserialize, Serialize};

/// Complete driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatpadConfig {
    /// Serial device the chatpad is wired to
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Name of the virtual uinput keyboard
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Sleep between polling iterations
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Polling iterations between awake messages
    #[serde(default = "default_keepalive_ticks")]
    pub keepalive_ticks: u32,
    /// Exit on a scan code missing from the keymap instead of logging it
    #[serde(default)]
    pub strict_keymap: bool,
    /// Scan code → evdev key name, applied on top of the built-in table
    #[serde(default)]
    pub keymap: BTreeMap<String, String>,
}

fn default_port() -> String {
    "/dev/ttyAMA0".to_string()
}
fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_device_name() -> String {
    "xbox_chatpad_input".to_string()
}
fn default_poll_interval() -> u64 {
    100
}
fn default_keepalive_ticks() -> u32 {
    DEFAULT_KEEPALIVE_TICKS
}

impl Default for ChatpadConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            device_name: default_device_name(),
            poll_interval_ms: default_poll_interval(),
            keepalive_ticks: default_keepalive_ticks(),
            strict_keymap: false,
            keymap: BTreeMap::new(),
        }
    }
}

impl ChatpadConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatpad")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: ChatpadConfig = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Built-in keymap with this config's overrides applied
    pub fn keymap(&self) -> anyhow::Result<Keymap> {
        let keymap = Keymap::builtin()
            .with_overrides(
                self.keymap
                    .iter()
                    .map(|(code, name)| (code.as_str(), name.as_str())),
            )
            .context("invalid [keymap] entry")?;
        Ok(keymap)
    }

    /// Name for the uinput device, `name` taking precedence over the file.
    /// A blank name means no device is created.
    pub fn injection_device_name(&self, name: Option<String>) -> Option<String> {
        let name = name.unwrap_or_else(|| self.device_name.clone());
        if name.trim().is_empty() {
            None
        } else {
            Some(name)
        }
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            keepalive_ticks: self.keepalive_ticks,
            strict_keymap: self.strict_keymap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatpad_keyboard::Key;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: ChatpadConfig = toml::from_str("").unwrap();
        assert_eq!(config, ChatpadConfig::default());
        assert_eq!(config.port, "/dev/ttyAMA0");
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.keepalive_ticks, 10);
    }

    #[test]
    fn test_driver_config() {
        let config = ChatpadConfig {
            poll_interval_ms: 50,
            keepalive_ticks: 20,
            strict_keymap: true,
            ..ChatpadConfig::default()
        };
        let driver = config.driver_config();
        assert_eq!(driver.poll_interval, Duration::from_millis(50));
        assert_eq!(driver.keepalive_ticks, 20);
        assert!(driver.strict_keymap);
    }

    #[test]
    fn test_injection_device_name() {
        let config = ChatpadConfig::default();
        assert_eq!(
            config.injection_device_name(None).as_deref(),
            Some("xbox_chatpad_input")
        );
        assert_eq!(
            config
                .injection_device_name(Some("Chatpad".to_string()))
                .as_deref(),
            Some("Chatpad")
        );

        let blank: ChatpadConfig = toml::from_str("device_name = \"\"").unwrap();
        assert_eq!(blank.injection_device_name(None), None);
        assert_eq!(config.injection_device_name(Some("  ".to_string())), None);
    }

    #[test]
    fn test_keymap_overrides() {
        let config: ChatpadConfig = toml::from_str(
            r#"
port = "/dev/ttyUSB1"

[keymap]
"4" = "KEY_LEFTALT"
"120" = "TAB"
"#,
        )
        .unwrap();
        assert_eq!(config.port, "/dev/ttyUSB1");
        let keymap = config.keymap().unwrap();
        assert_eq!(keymap.get(4), Some(Key::KEY_LEFTALT));
        assert_eq!(keymap.get(120), Some(Key::KEY_TAB));
        assert_eq!(keymap.get(55), Some(Key::KEY_A));
    }

    #[test]
    fn test_bad_keymap_entry() {
        let mut config = ChatpadConfig::default();
        config
            .keymap
            .insert("abc".to_string(), "KEY_A".to_string());
        assert!(config.keymap().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ChatpadConfig {
            port: "/dev/ttyS1".to_string(),
            ..ChatpadConfig::default()
        };
        config
            .keymap
            .insert("17".to_string(), "KEY_F7".to_string());
        config.save(&path).unwrap();

        let loaded = ChatpadConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ChatpadConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, ChatpadConfig::default());
    }
}
