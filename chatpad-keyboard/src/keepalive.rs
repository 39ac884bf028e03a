//! Keepalive scheduling
//!
//! The chatpad stops sending key reports unless it is poked with the awake
//! message about once a second. The driver loop ticks [`Keepalive`] once per
//! polling iteration.

use chatpad_transport::protocol::{AWAKE_MESSAGE, INIT_MESSAGE};
use chatpad_transport::{Transport, TransportError};
use tracing::{debug, trace};

/// Polling iterations between awake messages
pub const DEFAULT_KEEPALIVE_TICKS: u32 = 10;

#[derive(Debug)]
pub struct Keepalive {
    counter: u32,
    threshold: u32,
    awake_sent: u64,
}

impl Keepalive {
    /// `threshold` of 0 is treated as 1 (awake on every tick)
    pub fn new(threshold: u32) -> Self {
        Self {
            counter: 0,
            threshold: threshold.max(1),
            awake_sent: 0,
        }
    }

    /// Send the init message followed by the first awake message
    pub fn start<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<(), TransportError> {
        debug!("Sending init message");
        transport.write_all(&INIT_MESSAGE)?;
        self.send_awake(transport)?;
        self.counter = 0;
        Ok(())
    }

    /// Count one polling iteration. Returns `true` if an awake message went
    /// out on this tick.
    pub fn tick<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<bool, TransportError> {
        self.counter += 1;
        if self.counter < self.threshold {
            return Ok(false);
        }
        self.send_awake(transport)?;
        self.counter = 0;
        Ok(true)
    }

    fn send_awake<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<(), TransportError> {
        trace!("Sending awake message");
        transport.write_all(&AWAKE_MESSAGE)?;
        self.awake_sent += 1;
        Ok(())
    }

    /// Ticks since the last awake message
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Awake messages sent, including the one at startup
    pub fn awake_sent(&self) -> u64 {
        self.awake_sent
    }
}

impl Default for Keepalive {
    fn default() -> Self {
        Self::new(DEFAULT_KEEPALIVE_TICKS)
    }
}
