//! Wall-clock timing around units of work.
//!
//! A unit is timed whether it succeeds or fails: `measure` hands back the
//! unit's output untouched (including any `Err`) next to the interval.

use std::future::Future;
use std::time::{Duration, Instant};

/// A running stopwatch. Consumed by [`Stopwatch::stop`].
#[derive(Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Record the start instant.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record the end instant and return the elapsed interval.
    pub fn stop(self) -> Interval {
        Interval(self.start.elapsed())
    }
}

/// Elapsed time between a stopwatch start and stop. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Interval(Duration);

impl Interval {
    pub const ZERO: Interval = Interval(Duration::ZERO);

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }
}

impl From<Interval> for Duration {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

/// Output of a measured unit of work.
#[derive(Debug)]
pub struct Timed<T> {
    pub value: T,
    pub interval: Interval,
}

/// Await `fut` and return its output together with the time it took.
pub async fn measure<F, T>(fut: F) -> Timed<T>
where
    F: Future<Output = T>,
{
    let watch = Stopwatch::start();
    let value = fut.await;
    Timed {
        value,
        interval: watch.stop(),
    }
}
