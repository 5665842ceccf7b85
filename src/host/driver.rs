//! Single-writer spin driver.
//!
//! A worker thread owns the engine. Hosts talk to it over an mpsc command
//! queue and receive frames and settle events on a second channel, so state
//! transitions happen on exactly one thread and never interleave.
//!
//! The event channel is bounded at [`EVENT_QUEUE_CAPACITY`]. Hosts are expected
//! to drain [`SpinDriver::events`]; when they don't, the worker drops events
//! instead of blocking or growing without limit. The settled result is still
//! available through [`SpinDriver::last_result`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::catalog::Catalog;
use crate::wheel::{
    ConfigError, InvalidStateError, SpinConfig, SpinEngine, SpinPhase, SpinResult,
    SpinStateSnapshot,
};

/// 25 frames per second
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(40);

/// Undrained events held before the worker starts dropping them
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Published by the worker while a spin runs
#[derive(Debug, Clone, PartialEq)]
pub enum SpinEvent {
    /// Post-tick state, one per tick
    Frame(SpinStateSnapshot),
    /// Emitted once per spin, after the final frame
    Settled(SpinResult),
}

#[derive(Debug, Error, PartialEq)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    State(#[from] InvalidStateError),
    #[error("spin driver worker has stopped")]
    Disconnected,
}

#[derive(Debug, Clone, Copy)]
enum StartMode {
    Random,
    Seeded(u64),
    Velocity(f64),
}

enum Command {
    Configure {
        catalog: Catalog,
        config: SpinConfig,
        reply: Sender<Result<(), ConfigError>>,
    },
    StageCatalog {
        catalog: Catalog,
        reply: Sender<Result<(), ConfigError>>,
    },
    Start {
        mode: StartMode,
        reply: Sender<Result<(), InvalidStateError>>,
    },
    Abort {
        reply: Sender<Result<SpinResult, InvalidStateError>>,
    },
    Snapshot {
        reply: Sender<SpinStateSnapshot>,
    },
    LastResult {
        reply: Sender<Option<SpinResult>>,
    },
    Shutdown,
}

/// Handle to a spin engine running on its own tick thread.
pub struct SpinDriver {
    commands: Sender<Command>,
    events: Receiver<SpinEvent>,
    worker: Option<JoinHandle<()>>,
}

impl SpinDriver {
    /// Move `engine` onto a worker thread that ticks every `tick_interval`
    /// while a spin is in progress.
    pub fn spawn(engine: SpinEngine, tick_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
        let worker = thread::Builder::new()
            .name("spin-driver".into())
            .spawn(move || run_worker(engine, cmd_rx, event_tx, tick_interval))
            .map_err(|e| log::error!("Failed to spawn spin driver: {}", e))
            .ok();
        Self {
            commands: cmd_tx,
            events: event_rx,
            worker,
        }
    }

    pub fn configure(&self, catalog: Catalog, config: SpinConfig) -> Result<(), DriverError> {
        self.request(|reply| Command::Configure {
            catalog,
            config,
            reply,
        })?
        .map_err(DriverError::from)
    }

    pub fn stage_catalog(&self, catalog: Catalog) -> Result<(), DriverError> {
        self.request(|reply| Command::StageCatalog { catalog, reply })?
            .map_err(DriverError::from)
    }

    pub fn start_spin(&self) -> Result<(), DriverError> {
        self.start(StartMode::Random)
    }

    pub fn start_spin_seeded(&self, seed: u64) -> Result<(), DriverError> {
        self.start(StartMode::Seeded(seed))
    }

    pub fn start_spin_with_velocity(&self, velocity: f64) -> Result<(), DriverError> {
        self.start(StartMode::Velocity(velocity))
    }

    pub fn abort_spin(&self) -> Result<SpinResult, DriverError> {
        self.request(|reply| Command::Abort { reply })?
            .map_err(DriverError::from)
    }

    pub fn snapshot(&self) -> Result<SpinStateSnapshot, DriverError> {
        self.request(|reply| Command::Snapshot { reply })
    }

    pub fn last_result(&self) -> Result<Option<SpinResult>, DriverError> {
        self.request(|reply| Command::LastResult { reply })
    }

    /// Frame and settle events, in tick order. Frames are dropped while the
    /// queue is full.
    pub fn events(&self) -> &Receiver<SpinEvent> {
        &self.events
    }

    /// Drain events until the current spin settles. `Ok(None)` on timeout.
    pub fn wait_settled(&self, timeout: Duration) -> Result<Option<SpinResult>, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(SpinEvent::Settled(result)) => return Ok(Some(result)),
                Ok(SpinEvent::Frame(_)) => {}
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(DriverError::Disconnected),
            }
        }
    }

    /// Stop the worker and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn start(&self, mode: StartMode) -> Result<(), DriverError> {
        self.request(|reply| Command::Start { mode, reply })?
            .map_err(DriverError::from)
    }

    fn request<T>(&self, build: impl FnOnce(Sender<T>) -> Command) -> Result<T, DriverError> {
        let (tx, rx) = mpsc::channel();
        self.commands
            .send(build(tx))
            .map_err(|_| DriverError::Disconnected)?;
        rx.recv().map_err(|_| DriverError::Disconnected)
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.commands.send(Command::Shutdown);
            if worker.join().is_err() {
                log::error!("Spin driver worker panicked");
            }
        }
    }
}

impl Drop for SpinDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    mut engine: SpinEngine,
    commands: Receiver<Command>,
    events: SyncSender<SpinEvent>,
    tick_interval: Duration,
) {
    log::debug!("Spin driver started ({:?} per tick)", tick_interval);
    let mut next_tick = Instant::now() + tick_interval;

    loop {
        // Idle: block on commands. Spinning: wait only until the next tick is due.
        let command = if engine.phase() == SpinPhase::Spinning {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match commands.recv_timeout(wait) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        let Some(command) = command else {
            let snapshot = engine.tick();
            if let Err(TrySendError::Full(_)) = events.try_send(SpinEvent::Frame(snapshot)) {
                log::trace!("Event queue full, dropped frame {}", snapshot.tick_count);
            }
            if snapshot.phase == SpinPhase::Settled {
                publish_settled(&engine, &events);
            }
            next_tick += tick_interval;
            let now = Instant::now();
            if next_tick < now {
                // Fell behind (slow host); don't burst to catch up
                next_tick = now + tick_interval;
            }
            continue;
        };

        match command {
            Command::Configure {
                catalog,
                config,
                reply,
            } => {
                let _ = reply.send(engine.configure(catalog, config));
            }
            Command::StageCatalog { catalog, reply } => {
                let _ = reply.send(engine.stage_catalog(catalog));
            }
            Command::Start { mode, reply } => {
                let started = match mode {
                    StartMode::Random => engine.start_spin(),
                    StartMode::Seeded(seed) => engine.start_spin_seeded(seed),
                    StartMode::Velocity(v) => engine.start_spin_with_velocity(v),
                };
                if started.is_ok() {
                    next_tick = Instant::now() + tick_interval;
                }
                let _ = reply.send(started);
            }
            Command::Abort { reply } => {
                let aborted = engine.abort_spin().cloned();
                if aborted.is_ok() {
                    publish_settled(&engine, &events);
                }
                let _ = reply.send(aborted);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(engine.current_snapshot());
            }
            Command::LastResult { reply } => {
                let _ = reply.send(engine.last_result().cloned());
            }
            Command::Shutdown => break,
        }
    }

    log::debug!("Spin driver stopped");
}

fn publish_settled(engine: &SpinEngine, events: &SyncSender<SpinEvent>) {
    if let Some(result) = engine.last_result() {
        if let Err(TrySendError::Full(_)) = events.try_send(SpinEvent::Settled(result.clone())) {
            log::warn!(
                "Event queue full, settle event for spin {} dropped",
                result.spin_id
            );
        }
    }
}
