//! Key change printer for the `monitor` command

use std::io::Write;
use std::str::FromStr;
use std::time::Instant;

use chatpad_keyboard::{Keymap, ScanCode};
use chatpad_transport::Modifier;
use serde::Serialize;

/// Output format for the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// One printed line in JSON mode
#[derive(Serialize)]
struct ChangeRecord<'a> {
    timestamp: f64,
    pressed: &'a [ScanCode],
    released: &'a [ScanCode],
    #[serde(skip_serializing_if = "Option::is_none")]
    pressed_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    released_keys: Option<Vec<String>>,
}

/// Writes one line per key change
pub struct EventPrinter<W: Write> {
    out: W,
    format: OutputFormat,
    /// Annotate codes with key names when set
    keymap: Option<Keymap>,
    start: Instant,
}

impl<W: Write> EventPrinter<W> {
    pub fn new(out: W, format: OutputFormat, keymap: Option<Keymap>) -> Self {
        Self {
            out,
            format,
            keymap,
            start: Instant::now(),
        }
    }

    pub fn print(&mut self, pressed: &[ScanCode], released: &[ScanCode]) -> std::io::Result<()> {
        let timestamp = self.start.elapsed().as_secs_f64();
        match self.format {
            OutputFormat::Text => {
                let line = format!(
                    "[{:>9.3}s] pressed: {}  released: {}",
                    timestamp,
                    self.describe(pressed),
                    self.describe(released)
                );
                writeln!(self.out, "{}", line)?;
            }
            OutputFormat::Json => {
                let record = ChangeRecord {
                    timestamp,
                    pressed,
                    released,
                    pressed_keys: self.names(pressed),
                    released_keys: self.names(released),
                };
                serde_json::to_writer(&mut self.out, &record)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    fn names(&self, codes: &[ScanCode]) -> Option<Vec<String>> {
        self.keymap
            .as_ref()
            .map(|keymap| codes.iter().map(|&c| key_name(keymap, c)).collect())
    }

    fn describe(&self, codes: &[ScanCode]) -> String {
        if codes.is_empty() {
            return "-".to_string();
        }
        codes
            .iter()
            .map(|&code| {
                let label = match (&self.keymap, Modifier::from_id(code)) {
                    (Some(keymap), _) => Some(key_name(keymap, code)),
                    (None, Some(modifier)) => Some(modifier.display_name().to_string()),
                    (None, None) => None,
                };
                match label {
                    Some(label) => format!("{} ({})", code, label),
                    None => code.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn key_name(keymap: &Keymap, code: ScanCode) -> String {
    match keymap.get(code) {
        Some(key) => format!("{:?}", key),
        None => "UNMAPPED".to_string(),
    }
}
