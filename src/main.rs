use lookahead::{MonotonicTime, Score, Sequencer, TimeSource};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let score = match std::env::args_os().nth(1) {
        Some(path) => Score::load(&PathBuf::from(path))?,
        None => Score::demo(),
    };
    tracing::info!(
        name = %score.name,
        tempo = score.tempo,
        events = score.events.len(),
        "loaded score"
    );

    let time = MonotonicTime::new();
    let mut sequencer = Sequencer::new(time, score.config.clone())?;

    let events = score.to_events(move |label, at| {
        // How far ahead of its scheduled time the event was handed over.
        let ahead_ms = (at - time.now()) * 1000.0;
        tracing::info!(
            label,
            at = %format_args!("{at:.3}"),
            ahead_ms = %format_args!("{ahead_ms:.1}"),
            "event"
        );
    });
    let options = score
        .options()
        .with_on_stop(|reason| tracing::info!(%reason, "playback ended"));

    sequencer.play(events, options)?;

    let deadline = score
        .play_seconds
        .map(|seconds| Instant::now() + Duration::from_secs_f64(seconds.max(0.0)));
    sequencer.run_until(|_| deadline.is_some_and(|deadline| Instant::now() >= deadline))?;
    sequencer.stop();

    Ok(())
}
