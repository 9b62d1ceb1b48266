//! Lookahead event sequencer.
//!
//! Dispatches musical events at precise times against a caller-supplied
//! time source while being woken by a coarse periodic clock. Every tick hands
//! out all events falling inside the next lookahead window, each with its
//! exact scheduled time, so downstream output can be timed precisely no
//! matter how late the tick itself arrived.
//!
//! Musical positions are measured in whole notes; at tempo `bpm` one whole
//! note lasts `240 / bpm` seconds.

pub mod clock;
pub mod config;
mod engine;
pub mod error;
pub mod events;
pub mod score;
pub mod time;
pub mod timing;

pub use clock::{Clock, InlineClock, IsolatedClock, Tick};
pub use config::{ConfigError, SequencerConfig};
pub use engine::{Sequencer, SequencerState};
pub use error::{BoxError, ClockError, SequencerError};
pub use events::{Callback, Event, OnStop, PlayOptions, StopReason};
pub use score::{Score, ScoreEvent};
pub use time::{ManualTime, MonotonicTime, TimeSource};
