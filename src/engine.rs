use std::time::Duration;

use crate::clock::{self, Clock};
use crate::config::SequencerConfig;
use crate::error::SequencerError;
use crate::events::{Event, OnStop, PlayOptions, StopReason};
use crate::time::TimeSource;
use crate::timing::{Advance, EventTable, PlaybackState, TempoClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Playing,
    Stopped(StopReason),
}

/// Lookahead event sequencer.
///
/// Each clock tick dispatches every event scheduled before
/// `now + lookahead`, passing callbacks their scheduled time rather than the
/// time they happen to run. Tick jitter therefore only changes how early an
/// event is handed over, never the time it carries.
///
/// Ticks are handled on whichever thread drives the sequencer, through
/// [`Sequencer::pump`], [`Sequencer::run`], [`Sequencer::run_until`], or by
/// calling [`Sequencer::on_tick`] directly.
pub struct Sequencer<T: TimeSource> {
    time: T,
    config: SequencerConfig,
    clock: Box<dyn Clock>,
    state: SequencerState,
    playback: Option<PlaybackState>,
    on_stop: Option<OnStop>,
}

impl<T: TimeSource> Sequencer<T> {
    /// Creates a sequencer with the clock backend selected by `config`.
    pub fn new(time: T, config: SequencerConfig) -> Result<Self, SequencerError> {
        config.validate()?;
        let clock = clock::from_config(&config)?;
        Ok(Self::from_parts(time, config, clock))
    }

    pub fn with_clock(
        time: T,
        config: SequencerConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self, SequencerError> {
        config.validate()?;
        Ok(Self::from_parts(time, config, clock))
    }

    fn from_parts(time: T, config: SequencerConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            time,
            config,
            clock,
            state: SequencerState::Idle,
            playback: None,
            on_stop: None,
        }
    }

    /// Starts a new session, replacing the current one.
    ///
    /// Invalid input and clock failures are reported before anything
    /// changes, so a failed call leaves a running session playing.
    pub fn play(&mut self, events: Vec<Event>, options: PlayOptions) -> Result<(), SequencerError> {
        let tempo = TempoClock::new(options.tempo)?;
        if let Some(start) = options.start_time {
            if !start.is_finite() {
                return Err(SequencerError::InvalidStartTime(start));
            }
        }
        let table = EventTable::build(events, options.loop_length)?;
        if !table.loop_fits_tempo(&tempo) {
            return Err(SequencerError::InvalidLoopLength {
                length: table.duration(),
                last_event: table.last_event_time(),
            });
        }

        let start_time = options
            .start_time
            .unwrap_or_else(|| self.time.now() + self.config.lookahead);
        let playback = PlaybackState::new(table, tempo, start_time);

        // Restarting a running clock moves it to a new generation, so the old
        // session's ticks are dropped without a stop in between.
        self.clock.start(self.config.interval_duration())?;
        if self.is_playing() {
            self.end_session(StopReason::Stopped);
        }

        tracing::debug!(
            events = playback.table().len(),
            tempo = tempo.bpm(),
            loop_length = ?playback.table().loop_length(),
            start_time,
            "playback started"
        );

        self.playback = Some(playback);
        self.on_stop = options.on_stop;
        self.state = SequencerState::Playing;
        Ok(())
    }

    /// Stops playback and notifies `on_stop` with [`StopReason::Stopped`].
    /// Does nothing unless playing.
    pub fn stop(&mut self) {
        if self.is_playing() {
            self.halt(StopReason::Stopped);
        }
    }

    /// Sets the tempo used for every event time computed from now on. Events
    /// already inside the lookahead window keep their timing. Ignored unless
    /// playing.
    ///
    /// A tempo so fast that one loop pass would take under
    /// [`MIN_LOOP_SECONDS`](crate::timing::MIN_LOOP_SECONDS) is rejected.
    pub fn change_tempo(&mut self, bpm: f64) -> Result<(), SequencerError> {
        if !self.is_playing() {
            return Ok(());
        }
        if let Some(playback) = self.playback.as_mut() {
            let tempo = TempoClock::new(bpm)?;
            if !playback.table().loop_fits_tempo(&tempo) {
                return Err(SequencerError::InvalidTempo(bpm));
            }
            *playback.tempo_mut() = tempo;
            tracing::debug!(tempo = bpm, "tempo changed");
        }
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.state == SequencerState::Playing
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn tempo(&self) -> Option<f64> {
        self.playback.as_ref().map(|p| p.tempo().bpm())
    }

    /// Scheduled time of the next event to dispatch.
    pub fn next_event_time(&self) -> Option<f64> {
        self.playback.as_ref().map(PlaybackState::next_event_time)
    }

    /// Handles one clock tick: dispatches and advances past every event due
    /// before `now + lookahead`. Returns the number of events stepped over,
    /// loop markers included.
    ///
    /// A failing callback ends the pass early with its error. The failed
    /// event is not retried and the remaining due events go out on the next
    /// tick. A loop whose passes no longer move time forward is stopped with
    /// [`SequencerError::LoopStalled`].
    pub fn on_tick(&mut self) -> Result<usize, SequencerError> {
        if !self.is_playing() {
            return Ok(0);
        }

        let horizon = self.time.now() + self.config.lookahead;
        let mut steps = 0;

        while self.is_playing() {
            let Some(playback) = self.playback.as_mut() else {
                break;
            };
            if !playback.is_due(horizon) {
                break;
            }

            let time = playback.next_event_time();
            tracing::trace!(index = playback.next_event_index(), time, "dispatch");
            let dispatched = playback.dispatch();
            let advance = playback.advance();
            steps += 1;

            match advance {
                Advance::Moved => {}
                Advance::End => self.halt(StopReason::Finished),
                Advance::Stalled => {
                    tracing::warn!(time, "loop pass does not move time forward");
                    self.halt(StopReason::Stopped);
                    return Err(SequencerError::LoopStalled { time });
                }
            }

            if let Err(source) = dispatched {
                tracing::warn!(time, error = %source, "event callback failed");
                return Err(SequencerError::Callback { time, source });
            }
        }

        Ok(steps)
    }

    /// Waits up to `timeout` for one clock tick and handles it. Returns
    /// whether the sequencer is still playing.
    ///
    /// A clock that can no longer tick stops the session and its error is
    /// returned.
    pub fn pump(&mut self, timeout: Duration) -> Result<bool, SequencerError> {
        if !self.is_playing() {
            return Ok(false);
        }
        let tick = match self.clock.wait_tick(timeout) {
            Ok(tick) => tick,
            Err(e) => {
                tracing::warn!(error = %e, "clock failed");
                self.halt(StopReason::Stopped);
                return Err(e.into());
            }
        };
        if let Some(tick) = tick {
            tracing::trace!(generation = tick.generation, index = tick.index, "tick");
            self.on_tick()?;
        }
        Ok(self.is_playing())
    }

    /// Handles ticks until playback ends or a callback fails. A looping
    /// sequence never ends on its own; use [`Sequencer::run_until`] for loops.
    pub fn run(&mut self) -> Result<(), SequencerError> {
        let timeout = self.config.interval_duration();
        while self.pump(timeout)? {}
        Ok(())
    }

    /// Handles ticks until `done` returns true or playback ends. `done` is
    /// checked before every tick.
    pub fn run_until<F>(&mut self, mut done: F) -> Result<(), SequencerError>
    where
        F: FnMut(&Self) -> bool,
    {
        let timeout = self.config.interval_duration();
        while !done(self) && self.pump(timeout)? {}
        Ok(())
    }

    fn halt(&mut self, reason: StopReason) {
        self.clock.stop();
        self.end_session(reason);
    }

    fn end_session(&mut self, reason: StopReason) {
        self.state = SequencerState::Stopped(reason);
        self.playback = None;
        tracing::debug!(%reason, "playback ended");
        if let Some(mut on_stop) = self.on_stop.take() {
            on_stop(reason);
        }
    }
}
