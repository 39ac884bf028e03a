//! Event sinks and fan-out
//!
//! Every distinct key change is handed to a [`Dispatcher`], which forwards it
//! to two independently configured sinks:
//!
//! - a raw sink receiving chatpad scan codes (modifier ids included)
//! - a platform sink translating codes through a [`Keymap`] first
//!
//! A slot that is not wanted holds a [`NoopSink`].

use std::collections::BTreeSet;

use evdev::Key;
use tracing::{debug, warn};

use crate::error::SinkError;
use crate::keymap::Keymap;
use crate::state::{KeyChange, ScanCode};

/// Consumer of key changes
pub trait EventSink {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    fn dispatch(&mut self, change: &KeyChange) -> Result<(), SinkError>;
}

/// Sink that accepts and discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn dispatch(&mut self, _change: &KeyChange) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Delivers raw scan codes to a callback
pub struct RawSink<F> {
    callback: F,
}

impl<F> RawSink<F>
where
    F: FnMut(&[ScanCode], &[ScanCode]) -> Result<(), SinkError>,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventSink for RawSink<F>
where
    F: FnMut(&[ScanCode], &[ScanCode]) -> Result<(), SinkError>,
{
    fn name(&self) -> &'static str {
        "raw"
    }

    fn dispatch(&mut self, change: &KeyChange) -> Result<(), SinkError> {
        (self.callback)(&change.pressed, &change.released)
    }
}

/// Receiver of translated key lists
pub trait PlatformConsumer {
    fn on_keys(&mut self, pressed: &[Key], released: &[Key]) -> Result<(), SinkError>;
}

impl<F> PlatformConsumer for F
where
    F: FnMut(&[Key], &[Key]) -> Result<(), SinkError>,
{
    fn on_keys(&mut self, pressed: &[Key], released: &[Key]) -> Result<(), SinkError> {
        self(pressed, released)
    }
}

/// An OS input device that key events can be written to
pub trait KeyInjector {
    /// Queue a key transition
    fn write_key(&mut self, key: Key, is_down: bool) -> Result<(), SinkError>;

    /// Flush queued transitions as one input report
    fn sync(&mut self) -> Result<(), SinkError>;
}

/// Adapts a [`KeyInjector`] into a [`PlatformConsumer`]: presses, then
/// releases, then a single sync per change.
pub struct Injecting<I>(pub I);

impl<I: KeyInjector> PlatformConsumer for Injecting<I> {
    fn on_keys(&mut self, pressed: &[Key], released: &[Key]) -> Result<(), SinkError> {
        for &key in pressed {
            self.0.write_key(key, true)?;
        }
        for &key in released {
            self.0.write_key(key, false)?;
        }
        self.0.sync()
    }
}

/// Translates scan codes to platform keys before handing them on.
///
/// The whole change is translated up front, so an unmapped code fails the
/// call before the consumer sees any part of it.
///
/// Releases are only forwarded for codes whose press reached the consumer.
/// A rejected press therefore never comes back as an untranslatable release
/// in a later change, and the consumer never sees a key go up that it did
/// not see go down.
pub struct PlatformSink<C> {
    keymap: Keymap,
    consumer: C,
    /// Codes delivered as pressed and not yet released
    held: BTreeSet<ScanCode>,
}

impl<C: PlatformConsumer> PlatformSink<C> {
    pub fn new(keymap: Keymap, consumer: C) -> Self {
        Self {
            keymap,
            consumer,
            held: BTreeSet::new(),
        }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Codes the consumer currently holds down
    pub fn held(&self) -> impl Iterator<Item = ScanCode> + '_ {
        self.held.iter().copied()
    }
}

impl<I: KeyInjector> PlatformSink<Injecting<I>> {
    /// Platform sink writing straight to an injection device
    pub fn injecting(keymap: Keymap, injector: I) -> Self {
        Self::new(keymap, Injecting(injector))
    }
}

impl<C: PlatformConsumer> EventSink for PlatformSink<C> {
    fn name(&self) -> &'static str {
        "platform"
    }

    fn dispatch(&mut self, change: &KeyChange) -> Result<(), SinkError> {
        let pressed = self.keymap.translate_all(&change.pressed)?;
        let released_codes: Vec<ScanCode> = change
            .released
            .iter()
            .copied()
            .filter(|code| self.held.contains(code))
            .collect();
        if released_codes.len() < change.released.len() {
            debug!(
                "Skipping release of undelivered codes in {:?}",
                change.released
            );
        }
        if pressed.is_empty() && released_codes.is_empty() {
            return Ok(());
        }
        let released = self.keymap.translate_all(&released_codes)?;

        self.consumer.on_keys(&pressed, &released)?;
        self.held.extend(change.pressed.iter().copied());
        for code in &released_codes {
            self.held.remove(code);
        }
        Ok(())
    }
}

/// Fans key changes out to the raw and platform sinks
pub struct Dispatcher {
    raw: Box<dyn EventSink>,
    platform: Box<dyn EventSink>,
}

impl Dispatcher {
    /// Dispatcher with both sinks disabled
    pub fn new() -> Self {
        Self {
            raw: Box::new(NoopSink),
            platform: Box::new(NoopSink),
        }
    }

    pub fn with_raw(mut self, sink: impl EventSink + 'static) -> Self {
        self.raw = Box::new(sink);
        self
    }

    pub fn with_platform(mut self, sink: impl EventSink + 'static) -> Self {
        self.platform = Box::new(sink);
        self
    }

    /// Deliver `change` to both sinks. Both are always called; the first
    /// failure is returned.
    pub fn dispatch(&mut self, change: &KeyChange) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in [&mut self.raw, &mut self.platform] {
            if let Err(e) = sink.dispatch(change) {
                warn!("{} sink failed: {}", sink.name(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
