use crate::error::SequencerError;

/// Seconds per whole note at 1 BPM: 60 s/min times 4 quarter-note beats.
pub const SECONDS_PER_WHOLE_NOTE_AT_ONE_BPM: f64 = 240.0;

/// Shortest loop pass, in seconds, that a session may run at.
pub const MIN_LOOP_SECONDS: f64 = 0.001;

pub fn validate_tempo(bpm: f64) -> Result<f64, SequencerError> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(bpm)
    } else {
        Err(SequencerError::InvalidTempo(bpm))
    }
}

/// Converts musical distances (whole notes) to seconds at the current tempo.
///
/// The tempo is read on every conversion, so a change applies to every
/// distance converted after it and to nothing converted before.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoClock {
    bpm: f64,
}

impl TempoClock {
    pub fn new(bpm: f64) -> Result<Self, SequencerError> {
        Ok(Self {
            bpm: validate_tempo(bpm)?,
        })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), SequencerError> {
        self.bpm = validate_tempo(bpm)?;
        Ok(())
    }

    pub fn seconds_per_unit(&self) -> f64 {
        SECONDS_PER_WHOLE_NOTE_AT_ONE_BPM / self.bpm
    }

    pub fn secs_from_units(&self, units: f64) -> f64 {
        units * self.seconds_per_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_note_lasts_one_second_at_240() {
        let tempo = TempoClock::new(240.0).unwrap();
        assert_eq!(tempo.seconds_per_unit(), 1.0);
        assert_eq!(tempo.secs_from_units(0.25), 0.25);
    }

    #[test]
    fn quarter_note_is_one_beat() {
        let tempo = TempoClock::new(120.0).unwrap();
        assert_eq!(tempo.secs_from_units(0.25), 0.5);
        assert_eq!(tempo.secs_from_units(1.0), 2.0);
    }

    #[test]
    fn reads_tempo_at_conversion_time() {
        let mut tempo = TempoClock::new(240.0).unwrap();
        let before = tempo.secs_from_units(0.5);
        tempo.set_bpm(120.0).unwrap();
        assert_eq!(before, 0.5);
        assert_eq!(tempo.secs_from_units(0.5), 1.0);
    }

    #[test]
    fn rejects_non_positive_tempo() {
        for bpm in [0.0, -60.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TempoClock::new(bpm),
                Err(SequencerError::InvalidTempo(_))
            ));
        }

        let mut tempo = TempoClock::new(100.0).unwrap();
        assert!(tempo.set_bpm(0.0).is_err());
        assert_eq!(tempo.bpm(), 100.0);
    }
}
