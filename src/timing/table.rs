use super::tempo::{MIN_LOOP_SECONDS, TempoClock};
use crate::error::SequencerError;
use crate::events::Event;

#[derive(Debug, Clone)]
struct Slot {
    event: Event,
    loop_marker: bool,
}

/// Time-sorted events with the musical distance from each one to the one
/// before it.
///
/// `deltas[0]` is the first event's own time, so summing `deltas[..=i]`
/// gives back `events[i].time`. When a loop length is configured the last
/// slot is a callback-less loop marker at that length.
#[derive(Debug, Clone)]
pub struct EventTable {
    slots: Vec<Slot>,
    deltas: Vec<f64>,
}

impl EventTable {
    pub fn build(events: Vec<Event>, loop_length: Option<f64>) -> Result<Self, SequencerError> {
        let mut last_event = 0.0_f64;
        for (index, event) in events.iter().enumerate() {
            if !event.time.is_finite() || event.time < 0.0 {
                return Err(SequencerError::InvalidEventTime {
                    index,
                    time: event.time,
                });
            }
            last_event = last_event.max(event.time);
        }

        if events.is_empty() && loop_length.is_none() {
            return Err(SequencerError::InvalidEvents);
        }

        let mut slots: Vec<Slot> = events
            .into_iter()
            .map(|event| Slot {
                event,
                loop_marker: false,
            })
            .collect();

        if let Some(length) = loop_length {
            if !length.is_finite() || length <= 0.0 || length <= last_event {
                return Err(SequencerError::InvalidLoopLength { length, last_event });
            }
            slots.push(Slot {
                event: Event::marker(length),
                loop_marker: true,
            });
        }

        // Stable: events sharing a time keep their input order.
        slots.sort_by(|a, b| a.event.time.total_cmp(&b.event.time));

        let deltas = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                if i == 0 {
                    slot.event.time
                } else {
                    slot.event.time - slots[i - 1].event.time
                }
            })
            .collect();

        Ok(Self { slots, deltas })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn event(&self, index: usize) -> &Event {
        &self.slots[index].event
    }

    pub fn delta(&self, index: usize) -> f64 {
        self.deltas[index]
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.slots.iter().map(|slot| slot.event.time)
    }

    pub fn is_loop_marker(&self, index: usize) -> bool {
        self.slots[index].loop_marker
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.slots.len()
    }

    pub fn loop_length(&self) -> Option<f64> {
        self.slots
            .last()
            .filter(|slot| slot.loop_marker)
            .map(|slot| slot.event.time)
    }

    /// Musical length of one pass: the loop length, or the last event time.
    pub fn duration(&self) -> f64 {
        self.slots.last().map_or(0.0, |slot| slot.event.time)
    }

    /// Latest time among the real events, ignoring the loop marker.
    pub fn last_event_time(&self) -> f64 {
        self.slots
            .iter()
            .filter(|slot| !slot.loop_marker)
            .map(|slot| slot.event.time)
            .fold(0.0, f64::max)
    }

    /// Whether one loop pass lasts at least [`MIN_LOOP_SECONDS`] at `tempo`.
    /// Always true for a table without a loop.
    pub fn loop_fits_tempo(&self, tempo: &TempoClock) -> bool {
        self.loop_length()
            .is_none_or(|length| tempo.secs_from_units(length) >= MIN_LOOP_SECONDS)
    }
}
