use std::fmt;

use serde::{Deserialize, Serialize};

pub const MINUTES_PER_STEP: u8 = 5;

/// Wall clock shared by every inhabitant.
///
/// Starts at 10:30 and moves forward five minutes per step, wrapping at midnight.
/// The engine advances it after a step has been reported, so policies always
/// see the time the step started at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    hour: u8,
    minute: u8,
}

impl Clock {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn advance(&mut self) {
        let total = self.minute as u16 + MINUTES_PER_STEP as u16;
        self.minute = (total % 60) as u8;
        if total >= 60 {
            self.hour = (self.hour + 1) % 24;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(10, 30)
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
