//! # Timing
//!
//! Measures elapsed time and sends it as a statsd timer

use super::sender::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> Instant;
}

/// [Instant::now]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same instant, so a test can keep one handle and advance
/// the clock a [Timing] was started with.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn set(&self, instant: Instant) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A started measurement, see [Sender::new_timing]
///
/// # Example
/// ```no_run
/// # fn main() -> Result<(), statsd_fanout::ConfigError> {
/// let metrics = statsd_fanout::Sender::from_env()?;
///
/// let timing = metrics.new_timing();
/// // Do something important
/// timing.send("some_task.timing");
/// # Ok(())
/// # }
/// ```
pub struct Timing<'a, C: Clock = SystemClock> {
    start: Instant,
    sender: &'a Sender,
    clock: C,
}

impl<'a, C: Clock> Timing<'a, C> {
    pub fn new(sender: &'a Sender, clock: C) -> Self {
        Self {
            start: clock.now(),
            sender,
            clock,
        }
    }

    /// Time elapsed since the timing was started
    pub fn duration(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    /// Emit the elapsed time as a timer under `bucket` to every destination
    pub fn send(&self, bucket: &str) {
        self.sender.duration(bucket, self.duration());
    }
}
