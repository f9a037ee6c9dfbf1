//! Recording GPIO driver backing the unit tests.

use crate::errors::{Error, EINVAL};
use crate::gpio::{Direction, Level, PortDriver};

pub const NPINS: usize = 8;

pub struct MockPort {
    pub ready: bool,
    pub fail_configure: Option<i32>,
    pub dirs: [Option<Direction>; NPINS],
    pub levels: [Level; NPINS],
    pub writes: usize,
    pub reads: usize,
}

impl MockPort {
    pub fn new() -> Self {
        MockPort {
            ready: true,
            fail_configure: None,
            dirs: [None; NPINS],
            levels: [Level::Low; NPINS],
            writes: 0,
            reads: 0,
        }
    }

    pub fn not_ready() -> Self {
        MockPort {
            ready: false,
            ..MockPort::new()
        }
    }

    fn index(&self, pin: u8) -> Result<usize, Error> {
        let idx = pin as usize;
        if idx >= NPINS {
            return Err(Error::Driver(-EINVAL));
        }
        Ok(idx)
    }
}

impl PortDriver for MockPort {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn configure(&mut self, pin: u8, dir: Direction) -> Result<(), Error> {
        if let Some(code) = self.fail_configure {
            return Err(Error::Driver(code));
        }
        let idx = self.index(pin)?;
        self.dirs[idx] = Some(dir);
        Ok(())
    }

    fn set(&mut self, pin: u8, level: Level) -> Result<(), Error> {
        let idx = self.index(pin)?;
        self.writes += 1;
        self.levels[idx] = level;
        Ok(())
    }

    fn get(&mut self, pin: u8) -> Result<Level, Error> {
        let idx = self.index(pin)?;
        self.reads += 1;
        Ok(self.levels[idx])
    }
}
