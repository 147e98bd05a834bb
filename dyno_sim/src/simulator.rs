//! Simulator lifecycle: start, stop and the background tick thread.
//!
//! One `Simulator` runs at most one worker thread at a time. Each run gets
//! its own cancel flag, wake channel and [`SimulationLoop`], so nothing
//! carries over from a previous run and a worker that is still winding down
//! can never emit into a newer run.
//!
//! # Timing
//!
//! | Step | Period | Notes |
//! |------|--------|-------|
//! | physics tick | `physics_tick_ms` (10 ms) | sleeps the remainder of the period |
//! | snapshot | `ui_tick_ms` (50 ms) | delivered from the tick thread, never awaited |
//! | stop | ≤ one physics tick | the sleep wakes as soon as the run is cancelled |

use crate::clock::{Clock, MonotonicClock};
use crate::sim_loop::SimulationLoop;
use crate::sink::SnapshotSink;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use dyno_common::config::{ConfigError, SimulatorConfig, TimingConfig};
use dyno_common::snapshot::Snapshot;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors reported to the host.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The OS refused to start the tick thread.
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Counters for one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Physics ticks executed.
    pub ticks: u64,
    /// Snapshots accepted by the sink (including the seed snapshot).
    pub delivered: u64,
    /// Snapshots the sink failed to accept.
    pub dropped: u64,
    /// Ticks whose dt was replaced by the nominal period.
    pub clamped_dt: u64,
}

/// Handle to the worker of the current run.
struct ActiveRun {
    cancel: Arc<AtomicBool>,
    /// Dropping this disconnects the worker's wake channel.
    wake: Sender<()>,
    handle: JoinHandle<RunStats>,
}

impl ActiveRun {
    /// Signal cancellation and wake the worker. Returns the thread handle.
    fn cancel(self) -> JoinHandle<RunStats> {
        self.cancel.store(true, Ordering::SeqCst);
        drop(self.wake);
        self.handle
    }
}

#[derive(Default)]
struct Lifecycle {
    active: Option<ActiveRun>,
    runs: u64,
}

/// Synthetic dyno telemetry generator.
///
/// `start`, `stop` and `is_running` may be called from any thread.
pub struct Simulator {
    timing: TimingConfig,
    clock: Arc<dyn Clock>,
    running: Arc<AtomicBool>,
    lifecycle: Mutex<Lifecycle>,
}

impl Simulator {
    /// Create a simulator on real monotonic time.
    ///
    /// # Errors
    /// Returns `SimError::Config` if the configuration is invalid.
    pub fn new(config: &SimulatorConfig) -> Result<Self, SimError> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Create a simulator reading time from `clock`.
    ///
    /// The clock lives as long as the simulator, so ambient drift and Hold
    /// flutter stay continuous across runs.
    pub fn with_clock(config: &SimulatorConfig, clock: Arc<dyn Clock>) -> Result<Self, SimError> {
        config.validate()?;
        info!(
            "Simulator '{}' created: physics={}ms ui={}ms",
            config.shared.service_name, config.simulator.physics_tick_ms, config.simulator.ui_tick_ms
        );
        Ok(Self {
            timing: config.simulator,
            clock,
            running: Arc::new(AtomicBool::new(false)),
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }

    /// Start a run delivering snapshots to `sink`.
    ///
    /// A no-op if a run is already active; `sink` is dropped in that case.
    /// Otherwise the seed snapshot is delivered first, then one snapshot per
    /// UI tick until [`stop`](Self::stop).
    ///
    /// # Errors
    /// Returns `SimError::Spawn` if the tick thread cannot be created.
    pub fn start(&self, sink: impl SnapshotSink + 'static) -> Result<(), SimError> {
        let mut lifecycle = self.lock();
        if self.running.load(Ordering::SeqCst) {
            debug!("Start ignored: simulator already running");
            return Ok(());
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let (wake, wake_rx) = crossbeam_channel::bounded::<()>(0);
        let worker = Worker {
            timing: self.timing,
            clock: Arc::clone(&self.clock),
            cancel: Arc::clone(&cancel),
            wake: wake_rx,
            sink: Box::new(sink),
            stats: RunStats::default(),
        };

        let run_id = lifecycle.runs + 1;
        let handle = thread::Builder::new()
            .name(format!("dyno-sim-{run_id}"))
            .spawn(move || worker.run())?;

        lifecycle.runs = run_id;
        lifecycle.active = Some(ActiveRun {
            cancel,
            wake,
            handle,
        });
        self.running.store(true, Ordering::SeqCst);
        info!("Simulation run #{} started", run_id);
        Ok(())
    }

    /// Request termination of the current run. Idempotent, never blocks.
    ///
    /// The worker stops within one physics tick and delivers nothing after
    /// it observes the request.
    pub fn stop(&self) {
        let run = self.take_run();
        if run.is_some() {
            info!("Simulation stop requested");
        }
    }

    /// Stop and wait for the worker to finish.
    ///
    /// Returns the statistics of the stopped run, or `None` if nothing was
    /// running.
    pub fn stop_and_join(&self) -> Option<RunStats> {
        let handle = self.take_run()?;
        match handle.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                warn!("Simulation worker terminated abnormally");
                None
            }
        }
    }

    /// True between a successful `start` and the next `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Rates used by new runs.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    fn take_run(&self) -> Option<JoinHandle<RunStats>> {
        let mut lifecycle = self.lock();
        self.running.store(false, Ordering::SeqCst);
        lifecycle.active.take().map(ActiveRun::cancel)
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved into the tick thread.
struct Worker {
    timing: TimingConfig,
    clock: Arc<dyn Clock>,
    cancel: Arc<AtomicBool>,
    wake: Receiver<()>,
    sink: Box<dyn SnapshotSink>,
    stats: RunStats,
}

impl Worker {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn run(mut self) -> RunStats {
        let mut sim = SimulationLoop::new(self.timing, self.clock.now());
        let period = self.timing.physics_tick();

        if !self.cancelled() {
            self.emit(Snapshot::initial());
        }

        while !self.cancelled() {
            let cycle_start = Instant::now();

            let tick = sim.tick(self.clock.now());
            if let Some(snapshot) = tick.snapshot {
                if self.cancelled() {
                    break;
                }
                self.emit(snapshot);
            }

            // Sleep for the remaining period; a stop request wakes us early.
            let wait = period.saturating_sub(cycle_start.elapsed());
            match self.wake.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.stats.ticks = sim.ticks();
        self.stats.clamped_dt = sim.clamped_dt();
        info!(
            "Simulation run stopped after {} ticks ({} delivered, {} dropped, {} dt clamped)",
            self.stats.ticks, self.stats.delivered, self.stats.dropped, self.stats.clamped_dt
        );
        self.stats
    }

    /// Deliver one snapshot. Failures and consumer panics are counted and
    /// swallowed.
    fn emit(&mut self, snapshot: Snapshot) {
        let sink = &mut self.sink;
        match panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(snapshot))) {
            Ok(Ok(())) => self.stats.delivered += 1,
            Ok(Err(e)) => {
                self.stats.dropped += 1;
                debug!("Snapshot delivery failed: {}", e);
            }
            Err(_) => {
                self.stats.dropped += 1;
                warn!("Snapshot consumer panicked; continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use std::time::Duration;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulatorConfig::default();
        config.simulator.physics_tick_ms = 0;
        assert!(matches!(Simulator::new(&config), Err(SimError::Config(_))));
    }

    #[test]
    fn test_stop_when_stopped_is_noop() {
        let sim = Simulator::new(&SimulatorConfig::default()).unwrap();
        assert!(!sim.is_running());
        sim.stop();
        sim.stop();
        assert!(!sim.is_running());
        assert_eq!(sim.stop_and_join(), None);
    }

    #[test]
    fn test_first_snapshot_is_seed() {
        let sim = Simulator::new(&SimulatorConfig::default()).unwrap();
        let (sink, rx) = ChannelSink::bounded(64);
        sim.start(sink).unwrap();
        assert!(sim.is_running());

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, Snapshot::initial());

        let stats = sim.stop_and_join().unwrap();
        assert!(!sim.is_running());
        assert!(stats.delivered >= 1);
    }

    #[test]
    fn test_drop_stops_worker() {
        let (sink, rx) = ChannelSink::bounded(1024);
        {
            let sim = Simulator::new(&SimulatorConfig::default()).unwrap();
            sim.start(sink).unwrap();
            rx.recv_timeout(Duration::from_secs(2)).unwrap();
        }
        // Once the worker exits it drops the sender and the channel drains.
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Err(RecvTimeoutError::Disconnected) = rx.recv_timeout(Duration::from_millis(100)) {
                break;
            }
            assert!(Instant::now() < deadline, "worker kept running after drop");
        }
    }
}
