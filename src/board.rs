//! GPIO controller bank of the ESP32-C3.

use esp_hal::gpio::{Flex, InputConfig, OutputConfig, Pull};
use gpio_shell_core::errors::{Error, EINVAL};
use gpio_shell_core::gpio::{Direction, Level, PortDriver};

/// GPIO0..GPIO21.
pub const PIN_COUNT: usize = 22;

/// The chip's single GPIO controller, exposed to the shell as port A.
///
/// Only pins claimed at boot are usable; everything else is rejected with
/// a negative driver status, same as an out-of-range pin number.
pub struct Bank {
    pins: [Option<Flex<'static>>; PIN_COUNT],
}

impl Bank {
    /// Takes ownership of the given (pin number, pin) pairs.
    pub fn new<const N: usize>(pins: [(u8, Flex<'static>); N]) -> Self {
        let mut bank = Bank {
            pins: core::array::from_fn(|_| None),
        };
        for (num, pin) in pins {
            bank.pins[num as usize] = Some(pin);
        }
        bank
    }

    fn pin(&mut self, num: u8) -> Result<&mut Flex<'static>, Error> {
        self.pins
            .get_mut(num as usize)
            .and_then(Option::as_mut)
            .ok_or(Error::Driver(-EINVAL))
    }
}

impl PortDriver for Bank {
    fn is_ready(&self) -> bool {
        // esp_hal::init has run before the bank can be built
        true
    }

    fn configure(&mut self, num: u8, dir: Direction) -> Result<(), Error> {
        let pin = self.pin(num)?;
        match dir {
            Direction::Input => {
                pin.apply_input_config(&InputConfig::default().with_pull(Pull::None));
                pin.set_output_enable(false);
                pin.set_input_enable(true);
            }
            Direction::Output => {
                pin.apply_output_config(&OutputConfig::default());
                pin.set_output_enable(true);
                // keep the input path on so `gpio get` reads the driven level
                pin.set_input_enable(true);
            }
        }
        Ok(())
    }

    fn set(&mut self, num: u8, level: Level) -> Result<(), Error> {
        let pin = self.pin(num)?;
        match level {
            Level::Low => pin.set_low(),
            Level::High => pin.set_high(),
        }
        Ok(())
    }

    fn get(&mut self, num: u8) -> Result<Level, Error> {
        let pin = self.pin(num)?;
        Ok(pin.is_high().into())
    }
}
