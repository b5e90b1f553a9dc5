/// Frame delta in milliseconds
///
/// Particle spawn intervals, lifetimes and controller speeds are all
/// expressed per millisecond.

use std::ops::{Add, AddAssign};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct TimeStep(f32);

impl TimeStep {
    pub fn from_milliseconds(milliseconds: f32) -> Self {
        Self(milliseconds)
    }

    pub fn from_seconds(seconds: f32) -> Self {
        Self(seconds * 1000.0)
    }

    pub fn milliseconds(&self) -> f32 {
        self.0
    }

    pub fn seconds(&self) -> f32 {
        self.0 / 1000.0
    }
}

impl From<Duration> for TimeStep {
    fn from(duration: Duration) -> Self {
        Self(duration.as_secs_f32() * 1000.0)
    }
}

impl Add for TimeStep {
    type Output = TimeStep;

    fn add(self, other: TimeStep) -> TimeStep {
        TimeStep(self.0 + other.0)
    }
}

impl AddAssign for TimeStep {
    fn add_assign(&mut self, other: TimeStep) {
        self.0 += other.0;
    }
}
