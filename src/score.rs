use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigError, SequencerConfig};
use crate::events::{DEFAULT_TEMPO, Event, PlayOptions};
use crate::timing::validate_tempo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// Whole notes from the start of the score.
    pub time: f64,
    pub label: String,
}

/// A labelled sequence stored as RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    #[serde(default)]
    pub loop_length: Option<f64>,
    /// Wall-clock limit for playback. Required to end a looping score.
    #[serde(default)]
    pub play_seconds: Option<f64>,
    #[serde(default)]
    pub config: SequencerConfig,
    pub events: Vec<ScoreEvent>,
}

fn default_tempo() -> f64 {
    DEFAULT_TEMPO
}

impl Score {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let score: Score = ron::from_str(source)?;
        score.config.validate()?;
        validate_tempo(score.tempo)?;
        Ok(score)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// One bar of four quarter notes, looped for four seconds.
    pub fn demo() -> Self {
        let labels = ["kick", "hat", "snare", "hat"];
        Self {
            name: "demo".into(),
            tempo: DEFAULT_TEMPO,
            loop_length: Some(1.0),
            play_seconds: Some(4.0),
            config: SequencerConfig::default(),
            events: labels
                .iter()
                .enumerate()
                .map(|(i, label)| ScoreEvent {
                    time: i as f64 * 0.25,
                    label: (*label).into(),
                })
                .collect(),
        }
    }

    /// Builds sequencer events that hand each label and its scheduled time
    /// to `sink`.
    pub fn to_events<F>(&self, sink: F) -> Vec<Event>
    where
        F: Fn(&str, f64) + Send + Sync + 'static,
    {
        let sink = Arc::new(sink);
        self.events
            .iter()
            .map(|event| {
                let sink = sink.clone();
                let label = event.label.clone();
                Event::new(event.time, move |at| sink(&label, at))
            })
            .collect()
    }

    pub fn options(&self) -> PlayOptions {
        let options = PlayOptions::new().with_tempo(self.tempo);
        match self.loop_length {
            Some(length) => options.with_loop_length(length),
            None => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn parses_score_with_defaults() {
        let score = Score::from_ron_str(
            r#"(
                name: "pulse",
                events: [
                    (time: 0.0, label: "a"),
                    (time: 0.5, label: "b"),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(score.name, "pulse");
        assert_eq!(score.tempo, DEFAULT_TEMPO);
        assert_eq!(score.loop_length, None);
        assert_eq!(score.config, SequencerConfig::default());
        assert_eq!(score.events.len(), 2);
    }

    #[test]
    fn parses_loop_and_config() {
        let score = Score::from_ron_str(
            r#"(
                name: "loop",
                tempo: 90.0,
                loop_length: Some(2.0),
                play_seconds: Some(8.0),
                config: (use_isolated_clock: false),
                events: [(time: 1.5, label: "x")],
            )"#,
        )
        .unwrap();

        assert_eq!(score.tempo, 90.0);
        assert_eq!(score.loop_length, Some(2.0));
        assert_eq!(score.play_seconds, Some(8.0));
        assert!(!score.config.use_isolated_clock);

        let options = score.options();
        assert_eq!(options.tempo, 90.0);
        assert_eq!(options.loop_length, Some(2.0));
    }

    #[test]
    fn rejects_bad_tempo() {
        let err = Score::from_ron_str(r#"(name: "x", tempo: 0.0, events: [])"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn events_forward_labels() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let events = Score::demo().to_events(move |label, at| sink.lock().push((label.to_string(), at)));

        assert_eq!(events.len(), 4);
        for (i, event) in events.iter().enumerate() {
            event.fire(i as f64).unwrap();
        }

        let seen = seen.lock();
        assert_eq!(seen[0], ("kick".to_string(), 0.0));
        assert_eq!(seen[2], ("snare".to_string(), 2.0));
    }
}
