use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Monotonic absolute time in seconds.
pub trait TimeSource {
    fn now(&self) -> f64;
}

impl<F> TimeSource for F
where
    F: Fn() -> f64,
{
    fn now(&self) -> f64 {
        self()
    }
}

/// Seconds elapsed since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Time that only moves when told to. Clones share the same value, so one
/// handle can drive a sequencer that owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    seconds: Arc<Mutex<f64>>,
}

impl ManualTime {
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds: Arc::new(Mutex::new(seconds)),
        }
    }

    pub fn set(&self, seconds: f64) {
        *self.seconds.lock() = seconds;
    }

    pub fn advance(&self, seconds: f64) -> f64 {
        let mut now = self.seconds.lock();
        *now += seconds;
        *now
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> f64 {
        *self.seconds.lock()
    }
}
