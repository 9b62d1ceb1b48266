use std::thread;
use std::time::{Duration, Instant};

use super::{Clock, Tick};
use crate::error::ClockError;

/// Ticks on the caller's own thread: `wait_tick` sleeps until the next
/// deadline.
#[derive(Debug, Default)]
pub struct InlineClock {
    interval: Duration,
    running: bool,
    /// `None` while running once the next deadline lies past what
    /// `Instant` can represent.
    next_deadline: Option<Instant>,
    generation: u64,
    index: u64,
}

impl InlineClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for InlineClock {
    fn start(&mut self, interval: Duration) -> Result<(), ClockError> {
        self.generation += 1;
        self.index = 0;
        self.interval = interval;
        self.running = true;
        self.next_deadline = Some(Instant::now());
        tracing::debug!(generation = self.generation, ?interval, "inline clock started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.next_deadline = None;
            tracing::debug!(generation = self.generation, "inline clock stopped");
        }
    }

    fn wait_tick(&mut self, timeout: Duration) -> Result<Option<Tick>, ClockError> {
        if !self.running {
            return Ok(None);
        }
        let Some(deadline) = self.next_deadline else {
            thread::sleep(timeout);
            return Ok(None);
        };

        let now = Instant::now();
        if deadline > now {
            let wait = deadline - now;
            if wait > timeout {
                thread::sleep(timeout);
                return Ok(None);
            }
            thread::sleep(wait);
        }

        let tick = Tick {
            generation: self.generation,
            index: self.index,
        };
        self.index += 1;

        // Missed deadlines collapse into one late tick instead of a burst.
        self.next_deadline = deadline
            .checked_add(self.interval)
            .map(|next| next.max(Instant::now()));

        tracing::trace!(index = tick.index, "inline tick");
        Ok(Some(tick))
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
