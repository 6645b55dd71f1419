//! Clock

use std::fmt;

use jiff::Zoned;

/// Source of the current time.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current zoned time.
    fn now(&self) -> Zoned;
}

/// System time in the system time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Zoned {
        Zoned::now()
    }
}
