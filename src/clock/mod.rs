//! Periodic tick generators.
//!
//! A [`Clock`] produces coarse wake-ups for the sequencer. Both backends make
//! the first tick of a run available immediately and then one per interval
//! until stopped. Ticks are pulled by the consuming thread with
//! [`Clock::wait_tick`], so tick handling always happens on that thread no
//! matter where the ticks are generated.

mod inline;
mod isolated;

pub use inline::InlineClock;
pub use isolated::IsolatedClock;

use std::time::Duration;

use crate::config::SequencerConfig;
use crate::error::ClockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Incremented by every `start`. Ticks from an earlier run are never
    /// handed out.
    pub generation: u64,
    /// Position of this tick within its run, starting at zero.
    pub index: u64,
}

pub trait Clock: Send {
    /// Starts (or restarts) ticking every `interval`.
    fn start(&mut self, interval: Duration) -> Result<(), ClockError>;

    /// Stops ticking. Calling it while stopped does nothing.
    fn stop(&mut self);

    /// Blocks for at most `timeout` waiting for the next tick. Returns
    /// `Ok(None)` on timeout or when the clock is stopped, and an error once
    /// the clock can no longer tick at all.
    fn wait_tick(&mut self, timeout: Duration) -> Result<Option<Tick>, ClockError>;

    fn is_running(&self) -> bool;
}

pub fn from_config(config: &SequencerConfig) -> Result<Box<dyn Clock>, ClockError> {
    if config.use_isolated_clock {
        Ok(Box::new(IsolatedClock::new()?))
    } else {
        Ok(Box::new(InlineClock::new()))
    }
}
