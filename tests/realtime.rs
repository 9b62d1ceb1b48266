use lookahead::{
    Event, MonotonicTime, PlayOptions, Sequencer, SequencerConfig, SequencerState, StopReason,
    TimeSource,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn config(use_isolated_clock: bool) -> SequencerConfig {
    SequencerConfig {
        use_isolated_clock,
        ..Default::default()
    }
}

fn recording_events(times: &[f64], sink: &Arc<Mutex<Vec<f64>>>) -> Vec<Event> {
    times
        .iter()
        .map(|&t| {
            let sink = sink.clone();
            Event::new(t, move |at| sink.lock().push(at))
        })
        .collect()
}

fn assert_relative(recorded: &[f64], origin: f64, expected: &[f64]) {
    let relative: Vec<f64> = recorded.iter().map(|t| t - origin).collect();
    assert_eq!(relative.len(), expected.len(), "{relative:?}");
    for (a, e) in relative.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{relative:?} vs {expected:?}");
    }
}

fn plays_sequence_to_the_end(use_isolated_clock: bool) {
    let time = MonotonicTime::new();
    let mut sequencer = Sequencer::new(time, config(use_isolated_clock)).unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let stops = Arc::new(Mutex::new(Vec::new()));

    let start = time.now() + 0.1;
    let stop_sink = stops.clone();
    sequencer
        .play(
            recording_events(&[0.0, 0.75, 0.25, 0.5], &recorded),
            PlayOptions::new()
                .with_tempo(240.0)
                .with_start_time(start)
                .with_on_stop(move |reason| stop_sink.lock().push(reason)),
        )
        .unwrap();
    sequencer.run().unwrap();

    assert_relative(&recorded.lock(), start, &[0.0, 0.25, 0.5, 0.75]);
    assert_eq!(*stops.lock(), vec![StopReason::Finished]);
    assert_eq!(sequencer.state(), SequencerState::Stopped(StopReason::Finished));

    // Each event was handed over before its scheduled time passed by more
    // than the lookahead window.
    assert!(time.now() >= start + 0.75 - sequencer.config().lookahead);
}

fn loops_until_stopped(use_isolated_clock: bool) {
    let time = MonotonicTime::new();
    let mut sequencer = Sequencer::new(time, config(use_isolated_clock)).unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let stops = Arc::new(Mutex::new(Vec::new()));

    let start = time.now() + 0.1;
    let stop_sink = stops.clone();
    sequencer
        .play(
            recording_events(&[0.0, 0.25], &recorded),
            PlayOptions::new()
                .with_tempo(240.0)
                .with_loop_length(0.5)
                .with_start_time(start)
                .with_on_stop(move |reason| stop_sink.lock().push(reason)),
        )
        .unwrap();

    let counter = recorded.clone();
    sequencer.run_until(|_| counter.lock().len() >= 4).unwrap();
    assert!(sequencer.is_playing());
    sequencer.stop();

    let recorded = recorded.lock();
    assert_relative(&recorded[..4], start, &[0.0, 0.25, 0.5, 0.75]);
    assert_eq!(*stops.lock(), vec![StopReason::Stopped]);
}

#[test]
fn isolated_clock_plays_sequence() {
    plays_sequence_to_the_end(true);
}

#[test]
fn inline_clock_plays_sequence() {
    plays_sequence_to_the_end(false);
}

#[test]
fn isolated_clock_loops() {
    loops_until_stopped(true);
}

#[test]
fn inline_clock_loops() {
    loops_until_stopped(false);
}

#[test]
fn replay_after_stop_restarts_clock() {
    let time = MonotonicTime::new();
    let mut sequencer = Sequencer::new(time, config(true)).unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));

    sequencer
        .play(
            recording_events(&[0.0, 4.0], &recorded),
            PlayOptions::new().with_tempo(240.0),
        )
        .unwrap();
    let counter = recorded.clone();
    sequencer.run_until(|_| !counter.lock().is_empty()).unwrap();
    sequencer.stop();
    assert_eq!(recorded.lock().len(), 1);

    recorded.lock().clear();
    sequencer
        .play(
            recording_events(&[0.0, 0.125], &recorded),
            PlayOptions::new().with_tempo(240.0),
        )
        .unwrap();
    sequencer.run().unwrap();

    assert_eq!(recorded.lock().len(), 2);
    assert_eq!(sequencer.state(), SequencerState::Stopped(StopReason::Finished));
}

fn pumps_without_a_timeout(use_isolated_clock: bool) {
    let time = MonotonicTime::new();
    let mut sequencer = Sequencer::new(time, config(use_isolated_clock)).unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));

    sequencer
        .play(
            recording_events(&[0.0, 0.125], &recorded),
            PlayOptions::new().with_tempo(240.0),
        )
        .unwrap();
    while sequencer.pump(Duration::MAX).unwrap() {}

    assert_eq!(recorded.lock().len(), 2);
    assert_eq!(sequencer.state(), SequencerState::Stopped(StopReason::Finished));
}

#[test]
fn isolated_clock_pumps_with_unbounded_timeout() {
    pumps_without_a_timeout(true);
}

#[test]
fn inline_clock_pumps_with_unbounded_timeout() {
    pumps_without_a_timeout(false);
}
