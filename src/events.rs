use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;

pub type CallbackResult = Result<(), BoxError>;

/// Receives the scheduled dispatch time in seconds.
pub type Callback = Arc<dyn Fn(f64) -> CallbackResult + Send + Sync>;

/// Notified once when a playback session ends.
pub type OnStop = Box<dyn FnMut(StopReason) + Send>;

pub const DEFAULT_TEMPO: f64 = 120.0;

/// A musical event positioned in whole notes from the start of the sequence.
#[derive(Clone)]
pub struct Event {
    pub time: f64,
    callback: Option<Callback>,
}

impl Event {
    pub fn new<F>(time: f64, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        Self::fallible(time, move |at| {
            callback(at);
            Ok(())
        })
    }

    pub fn fallible<F>(time: f64, callback: F) -> Self
    where
        F: Fn(f64) -> CallbackResult + Send + Sync + 'static,
    {
        Self {
            time,
            callback: Some(Arc::new(callback)),
        }
    }

    /// Several events can share one callback.
    pub fn with_callback(time: f64, callback: Callback) -> Self {
        Self {
            time,
            callback: Some(callback),
        }
    }

    /// A structural event that takes a slot in the sequence but never fires.
    pub fn marker(time: f64) -> Self {
        Self {
            time,
            callback: None,
        }
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub(crate) fn fire(&self, at: f64) -> CallbackResult {
        match &self.callback {
            Some(callback) => callback(at),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("time", &self.time)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `stop()` was called, or a new `play()` replaced the session.
    Stopped,
    /// The last event of a non-looping sequence was dispatched.
    Finished,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Stopped => write!(f, "stopped"),
            StopReason::Finished => write!(f, "finished"),
        }
    }
}

/// Per-session options for `Sequencer::play`.
pub struct PlayOptions {
    pub tempo: f64,
    /// Loop length in whole notes. `None` plays the sequence once.
    pub loop_length: Option<f64>,
    /// Absolute time of musical position zero. Defaults to `now + lookahead`.
    pub start_time: Option<f64>,
    pub on_stop: Option<OnStop>,
}

impl PlayOptions {
    pub fn new() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            loop_length: None,
            start_time: None,
            on_stop: None,
        }
    }

    pub fn with_tempo(mut self, tempo: f64) -> Self {
        self.tempo = tempo;
        self
    }

    pub fn with_loop_length(mut self, loop_length: f64) -> Self {
        self.loop_length = Some(loop_length);
        self
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_on_stop<F>(mut self, on_stop: F) -> Self
    where
        F: FnMut(StopReason) + Send + 'static,
    {
        self.on_stop = Some(Box::new(on_stop));
        self
    }
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlayOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayOptions")
            .field("tempo", &self.tempo)
            .field("loop_length", &self.loop_length)
            .field("start_time", &self.start_time)
            .field("on_stop", &self.on_stop.is_some())
            .finish()
    }
}
