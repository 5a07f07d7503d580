//! Instruction clock.
use std::time::{Duration, Instant};

/// Paces the scheduler loop to a fixed instruction period.
///
/// Each iteration calls [`Clock::begin`] before executing and
/// [`Clock::wait`] afterwards to sleep away the remainder of the period.
/// An iteration that overruns its period simply drifts; the next period
/// is measured from its own start, never shortened to catch up.
pub(crate) struct Clock {
    period: Duration,
    start: Instant,
}

impl Clock {
    pub(crate) fn new(period: Duration) -> Self {
        Self {
            period,
            start: Instant::now(),
        }
    }

    /// Mark the start of the current period.
    #[inline]
    pub(crate) fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Sleep for whatever is left of the current period.
    ///
    /// `std::thread::sleep` has millisecond-ish granularity on most
    /// platforms, far too coarse for a sub-2ms instruction period, so the
    /// remainder is slept with `spin_sleep`.
    #[inline]
    pub(crate) fn wait(&self) {
        let elapsed = self.start.elapsed();
        if elapsed < self.period {
            spin_sleep::sleep(self.period - elapsed);
        }
    }
}
