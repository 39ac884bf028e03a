//! Chatpad driver loop
//!
//! One loop owns the transport and all key state:
//!
//! 1. send init + awake
//! 2. drain every buffered frame (sync → decode → diff → dispatch)
//! 3. tick the keepalive, sleep one poll interval, repeat
//!
//! Dispatch happens inline, so a sink that blocks stalls the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chatpad_transport::{DecodedFrame, FrameReader, Transport};
use tracing::{debug, error, info, trace};

use crate::error::DriverError;
use crate::keepalive::{Keepalive, DEFAULT_KEEPALIVE_TICKS};
use crate::sink::Dispatcher;
use crate::state::{KeyChange, KeyState, KeyStateTracker};

/// Default sleep between polling iterations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Loop tuning
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Sleep between polling iterations
    pub poll_interval: Duration,
    /// Polling iterations between awake messages
    pub keepalive_ticks: u32,
    /// Stop the loop when a sink fails instead of logging and continuing
    pub strict_keymap: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            keepalive_ticks: DEFAULT_KEEPALIVE_TICKS,
            strict_keymap: false,
        }
    }
}

/// Requests the driver loop to stop. Cloneable and usable from any thread
/// (e.g. a Ctrl+C handler).
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters for a driver session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Frames located in the byte stream
    pub frames: u64,
    /// Bytes dropped while resynchronizing
    pub discarded_bytes: u64,
    /// Frames ignored as repeats of the current state
    pub duplicates: u64,
    /// Key changes handed to the dispatcher
    pub dispatches: u64,
    /// Dispatches where at least one sink failed
    pub sink_errors: u64,
    /// Awake messages sent, including the one at startup
    pub keepalives: u64,
}

/// Chatpad driver over any transport
pub struct ChatpadDriver<T: Transport> {
    transport: T,
    reader: FrameReader,
    tracker: KeyStateTracker,
    keepalive: Keepalive,
    dispatcher: Dispatcher,
    config: DriverConfig,
    stop: StopHandle,
    sink_errors: u64,
    dispatches: u64,
}

impl<T: Transport> ChatpadDriver<T> {
    pub fn new(transport: T, dispatcher: Dispatcher, config: DriverConfig) -> Self {
        Self {
            transport,
            reader: FrameReader::new(),
            tracker: KeyStateTracker::new(),
            keepalive: Keepalive::new(config.keepalive_ticks),
            dispatcher,
            config,
            stop: StopHandle::new(),
            sink_errors: 0,
            dispatches: 0,
        }
    }

    /// Handle for stopping [`run`](Self::run) from elsewhere
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stats(&self) -> DriverStats {
        let sync = self.reader.stats();
        DriverStats {
            frames: sync.frames,
            discarded_bytes: sync.discarded_bytes,
            duplicates: self.tracker.duplicates(),
            dispatches: self.dispatches,
            sink_errors: self.sink_errors,
            keepalives: self.keepalive.awake_sent(),
        }
    }

    /// Keys currently held according to the last distinct frame
    pub fn key_state(&self) -> &KeyState {
        self.tracker.state()
    }

    pub fn keepalive(&self) -> &Keepalive {
        &self.keepalive
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send the init and first awake messages
    pub fn start(&mut self) -> Result<(), DriverError> {
        let info = self.transport.device_info();
        match info.baud_rate {
            Some(baud) => info!(
                "Starting chatpad driver on {} ({:?}, {} baud)",
                info.device_path, info.transport_type, baud
            ),
            None => info!(
                "Starting chatpad driver on {} ({:?})",
                info.device_path, info.transport_type
            ),
        }
        self.keepalive.start(&mut self.transport)?;
        Ok(())
    }

    /// Process every complete frame currently buffered. Returns the number of
    /// key changes dispatched.
    pub fn drain(&mut self) -> Result<usize, DriverError> {
        let mut dispatched = 0;
        while let Some(frame) = self.reader.next_frame(&mut self.transport)? {
            if self.stop.is_stopped() {
                debug!("Stop requested, dropping frame");
                break;
            }
            if self.handle_frame(&frame.decode())? {
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    /// One polling iteration without the sleep: drain, then tick the
    /// keepalive.
    pub fn poll_once(&mut self) -> Result<usize, DriverError> {
        let dispatched = self.drain()?;
        if self.stop.is_stopped() {
            return Ok(dispatched);
        }
        if self.keepalive.tick(&mut self.transport)? {
            trace!("Keepalive sent");
        }
        Ok(dispatched)
    }

    /// Run until stopped or the transport fails.
    ///
    /// Either way, keys still held are released through the sinks and the
    /// transport is closed. The loop error wins over a shutdown error.
    pub fn run(&mut self) -> Result<DriverStats, DriverError> {
        let looped = self.run_loop();
        let shut = self.shutdown();
        looped.and(shut)?;

        let stats = self.stats();
        info!(
            "Chatpad driver stopped: {} frames, {} key changes, {} duplicates",
            stats.frames, stats.dispatches, stats.duplicates
        );
        Ok(stats)
    }

    /// Decode everything already buffered, then shut down. Unlike
    /// [`run`](Self::run), no init or awake message is written.
    pub fn replay(&mut self) -> Result<DriverStats, DriverError> {
        let drained = self.drain().map(|_| ());
        let shut = self.shutdown();
        drained.and(shut)?;
        Ok(self.stats())
    }

    fn run_loop(&mut self) -> Result<(), DriverError> {
        self.start()?;
        while !self.stop.is_stopped() {
            self.poll_once()?;
            if self.stop.is_stopped() {
                break;
            }
            std::thread::sleep(self.config.poll_interval);
        }
        Ok(())
    }

    /// Release held keys and close the transport.
    ///
    /// The transport is closed even when delivering the release fails; the
    /// delivery error takes precedence over a close error.
    pub fn shutdown(&mut self) -> Result<(), DriverError> {
        let released = match self.tracker.release_all() {
            Some(change) => {
                debug!("Releasing held keys: {:?}", change.released);
                self.deliver(&change)
            }
            None => Ok(()),
        };
        let closed = self.transport.close().map_err(DriverError::from);
        released.and(closed)
    }

    fn handle_frame(&mut self, frame: &DecodedFrame) -> Result<bool, DriverError> {
        let Some(change) = self.tracker.update(frame) else {
            trace!("Duplicate frame {:?}", frame);
            return Ok(false);
        };
        debug!(
            "Key change: pressed {:?}, released {:?}",
            change.pressed, change.released
        );
        self.deliver(&change)?;
        Ok(true)
    }

    fn deliver(&mut self, change: &KeyChange) -> Result<(), DriverError> {
        self.dispatches += 1;
        if let Err(e) = self.dispatcher.dispatch(change) {
            self.sink_errors += 1;
            if self.config.strict_keymap {
                return Err(e.into());
            }
            error!("Dropped key change {:?}: {}", change, e);
        }
        Ok(())
    }
}
