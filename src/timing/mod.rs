mod playback;
mod table;
mod tempo;

pub use playback::{Advance, PlaybackState};
pub use table::EventTable;
pub use tempo::{MIN_LOOP_SECONDS, SECONDS_PER_WHOLE_NOTE_AT_ONE_BPM, TempoClock, validate_tempo};
