use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{Clock, Tick};
use crate::error::ClockError;

#[derive(Debug, Clone)]
enum ClockCommand {
    Start { generation: u64, interval: Duration },
    Stop,
    Shutdown,
}

/// Generates ticks on a dedicated thread. The thread shares no state with
/// the caller; it only receives commands and sends ticks back.
pub struct IsolatedClock {
    command_tx: Sender<ClockCommand>,
    tick_rx: Receiver<Tick>,
    generation: u64,
    running: bool,
    worker: Option<JoinHandle<()>>,
}

impl IsolatedClock {
    pub fn new() -> Result<Self, ClockError> {
        let (command_tx, command_rx) = crossbeam::channel::unbounded();
        let (tick_tx, tick_rx) = crossbeam::channel::unbounded();

        let worker = thread::Builder::new()
            .name("sequencer-clock".into())
            .spawn(move || clock_thread(command_rx, tick_tx))
            .map_err(ClockError::Spawn)?;

        Ok(Self {
            command_tx,
            tick_rx,
            generation: 0,
            running: false,
            worker: Some(worker),
        })
    }
}

impl Clock for IsolatedClock {
    fn start(&mut self, interval: Duration) -> Result<(), ClockError> {
        self.generation += 1;
        self.command_tx
            .send(ClockCommand::Start {
                generation: self.generation,
                interval,
            })
            .map_err(|_| ClockError::Disconnected)?;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        let _ = self.command_tx.send(ClockCommand::Stop);
        // Anything still queued belongs to the run that just ended.
        for _ in self.tick_rx.try_iter() {}
    }

    fn wait_tick(&mut self, timeout: Duration) -> Result<Option<Tick>, ClockError> {
        if !self.running {
            return Ok(None);
        }
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let received = match deadline {
                Some(deadline) => self.tick_rx.recv_deadline(deadline),
                None => self
                    .tick_rx
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(tick) if tick.generation == self.generation => return Ok(Some(tick)),
                Ok(stale) => {
                    tracing::trace!(generation = stale.generation, "dropping stale tick");
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    self.running = false;
                    tracing::warn!(generation = self.generation, "clock thread is gone");
                    return Err(ClockError::Disconnected);
                }
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl IsolatedClock {
    fn shutdown_worker(&mut self) {
        let _ = self.command_tx.send(ClockCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for IsolatedClock {
    fn drop(&mut self) {
        self.shutdown_worker();
    }
}

struct WorkerTimer {
    generation: u64,
    interval: Duration,
    /// `None` once the next deadline lies past what `Instant` can represent.
    deadline: Option<Instant>,
    index: u64,
}

fn clock_thread(command_rx: Receiver<ClockCommand>, tick_tx: Sender<Tick>) {
    let mut timer: Option<WorkerTimer> = None;

    loop {
        let received = match timer.as_ref().and_then(|t| t.deadline) {
            Some(deadline) => command_rx.recv_deadline(deadline),
            None => command_rx
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };
        let command = match received {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match command {
            Some(ClockCommand::Start {
                generation,
                interval,
            }) => {
                tracing::debug!(generation, ?interval, "clock thread started");
                timer = Some(WorkerTimer {
                    generation,
                    interval,
                    deadline: Some(Instant::now()),
                    index: 0,
                });
            }
            Some(ClockCommand::Stop) => {
                tracing::debug!("clock thread stopped");
                timer = None;
            }
            Some(ClockCommand::Shutdown) => break,
            None => {
                let Some(t) = timer.as_mut() else { continue };
                let tick = Tick {
                    generation: t.generation,
                    index: t.index,
                };
                if tick_tx.send(tick).is_err() {
                    break;
                }
                t.index += 1;
                t.deadline = t
                    .deadline
                    .and_then(|deadline| deadline.checked_add(t.interval))
                    .map(|next| next.max(Instant::now()));
            }
        }
    }

    tracing::debug!("clock thread exiting");
}
