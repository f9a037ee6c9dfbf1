//! Periodic LED blinking.

use crate::errors::Error;
use crate::gpio::{Direction, Level, Port, PortDriver, PortMap};

/// Compile-time description of one blinking LED.
#[derive(Debug, Clone, Copy)]
pub struct BlinkSpec {
    /// Port the LED hangs off.
    pub port: Port,

    /// Pin within the port.
    pub pin: u8,

    /// Time between toggles, in milliseconds.
    pub period_ms: u64,

    /// Identifier used in log lines.
    pub id: u8,
}

/// Lifecycle of one blinker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkState {
    /// Created, pin not configured yet.
    Ready,

    /// Pin configured, toggling until reset.
    Blinking,
}

/// Drives one LED.
///
/// [`Blinker::start`] must succeed before [`Blinker::toggle`] does
/// anything. A failed start leaves the blinker stopped for good; the
/// caller logs the error and gives up on this LED without touching any
/// other.
pub struct Blinker {
    spec: BlinkSpec,
    state: BlinkState,
    count: u32,
}

impl Blinker {
    pub const fn new(spec: BlinkSpec) -> Self {
        Blinker {
            spec,
            state: BlinkState::Ready,
            count: 0,
        }
    }

    pub fn spec(&self) -> &BlinkSpec {
        &self.spec
    }

    pub fn state(&self) -> BlinkState {
        self.state
    }

    /// Ready -> Blinking. Probes the device, then configures the pin as
    /// output. Any failure is final.
    pub fn start<D: PortDriver>(&mut self, ports: &mut PortMap<D>) -> Result<(), Error> {
        let dev = ports.get_mut(self.spec.port).ok_or(Error::BadPort)?;
        if !dev.is_ready() {
            return Err(Error::NotReady);
        }
        dev.configure(self.spec.pin, Direction::Output)?;
        self.state = BlinkState::Blinking;
        Ok(())
    }

    /// Drives the next half-cycle; the first call drives the pin low.
    pub fn toggle<D: PortDriver>(&mut self, ports: &mut PortMap<D>) -> Result<(), Error> {
        if self.state != BlinkState::Blinking {
            return Err(Error::NotReady);
        }
        let dev = ports.get_mut(self.spec.port).ok_or(Error::BadPort)?;
        let level = if self.count % 2 == 0 {
            Level::Low
        } else {
            Level::High
        };
        dev.set(self.spec.pin, level)?;
        self.count = self.count.wrapping_add(1);
        Ok(())
    }
}
