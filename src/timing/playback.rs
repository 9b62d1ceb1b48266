use super::{EventTable, TempoClock};
use crate::events::CallbackResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    /// The last event of a non-looping table was reached. The cursor stays put.
    End,
    /// A whole loop pass left the time of the loop marker where it was, so
    /// the cursor would cycle forever without reaching any horizon.
    Stalled,
}

/// Cursor over an [`EventTable`] for one playback session.
#[derive(Debug)]
pub struct PlaybackState {
    table: EventTable,
    tempo: TempoClock,
    next_event_index: usize,
    next_event_time: f64,
    last_wrap_time: Option<f64>,
}

impl PlaybackState {
    /// `start_time` is the absolute time of musical position zero.
    pub fn new(table: EventTable, tempo: TempoClock, start_time: f64) -> Self {
        let next_event_time = start_time + tempo.secs_from_units(table.delta(0));
        Self {
            table,
            tempo,
            next_event_index: 0,
            next_event_time,
            last_wrap_time: None,
        }
    }

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    pub fn tempo(&self) -> &TempoClock {
        &self.tempo
    }

    pub fn tempo_mut(&mut self) -> &mut TempoClock {
        &mut self.tempo
    }

    pub fn next_event_index(&self) -> usize {
        self.next_event_index
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn is_due(&self, horizon: f64) -> bool {
        self.next_event_time < horizon
    }

    /// Fires the current event's callback with its scheduled time.
    pub fn dispatch(&self) -> CallbackResult {
        self.table
            .event(self.next_event_index)
            .fire(self.next_event_time)
    }

    pub fn advance(&mut self) -> Advance {
        let index = self.next_event_index;
        let at_loop = self.table.is_loop_marker(index);

        if self.table.is_last(index) && !at_loop {
            return Advance::End;
        }

        if at_loop {
            let marker_time = self.next_event_time;
            if self.last_wrap_time.is_some_and(|previous| marker_time <= previous) {
                return Advance::Stalled;
            }
            self.last_wrap_time = Some(marker_time);
        }

        self.next_event_index = if at_loop { 0 } else { index + 1 };
        self.next_event_time += self
            .tempo
            .secs_from_units(self.table.delta(self.next_event_index));
        Advance::Moved
    }
}
