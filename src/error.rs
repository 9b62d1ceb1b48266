use thiserror::Error;

/// Error type returned by fallible event callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("nothing to schedule: event list is empty and no loop is configured")]
    InvalidEvents,

    #[error("event {index} has invalid time {time}")]
    InvalidEventTime { index: usize, time: f64 },

    #[error("invalid tempo {0}: must be positive and finite, and keep a loop pass at least 1 ms long")]
    InvalidTempo(f64),

    #[error("invalid loop length {length}: must exceed the last event time {last_event} and last at least 1 ms")]
    InvalidLoopLength { length: f64, last_event: f64 },

    #[error("start time must be finite, got {0}")]
    InvalidStartTime(f64),

    #[error("invalid sequencer config: {0}")]
    InvalidConfig(&'static str),

    #[error("loop pass at {time:.6}s no longer moves time forward")]
    LoopStalled { time: f64 },

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("event callback scheduled at {time:.6}s failed")]
    Callback {
        time: f64,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("failed to spawn clock thread")]
    Spawn(#[source] std::io::Error),

    #[error("clock thread is no longer running")]
    Disconnected,
}
