//! Single-threaded simulation stepper.
//!
//! `SimulationLoop` owns the cycle clock of one run and turns wall-clock
//! samples into physics ticks and, at the slower UI rate, rounded snapshots.
//! It has no threads and no sleeps: the caller supplies `now` on every tick,
//! which keeps segment boundaries and rounding exactly reproducible.

use crate::physics::{self, PhaseSegment};
use dyno_common::config::TimingConfig;
use dyno_common::consts::CYCLE_T;
use dyno_common::snapshot::Snapshot;
use tracing::{debug, trace};

/// Replace an implausible dt with the nominal physics period.
///
/// Non-finite, non-positive and stalled (`> max`) values are all replaced.
#[inline]
pub fn sanitize_dt(dt: f64, nominal: f64, max: f64) -> f64 {
    if !dt.is_finite() || dt <= 0.0 || dt > max {
        nominal
    } else {
        dt
    }
}

/// Advance a cycle phase by `dt`, wrapping by subtraction.
///
/// A step longer than one cycle (only possible with an unvalidated
/// `TimingConfig`) falls back to a Euclidean remainder so the tick stays
/// bounded.
#[inline]
pub fn advance_phase(phase: f64, dt: f64) -> f64 {
    let mut next = phase + dt;
    if next >= CYCLE_T {
        next -= CYCLE_T;
    }
    if next >= CYCLE_T {
        next = next.rem_euclid(CYCLE_T);
    }
    next
}

/// Result of one physics tick.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Cycle phase after this tick, in `[0, CYCLE_T)`.
    pub phase: f64,
    /// Segment containing `phase`.
    pub segment: PhaseSegment,
    /// Raw reading (unrounded, Hold jitter applied).
    pub sample: Snapshot,
    /// Rounded snapshot, present when the UI period has elapsed.
    pub snapshot: Option<Snapshot>,
}

/// Stepper state for one run.
#[derive(Debug, Clone)]
pub struct SimulationLoop {
    timing: TimingConfig,
    /// Elapsed time within the current lap.
    phase: f64,
    /// Wall time of the previous physics tick.
    last_tick: f64,
    /// Wall time of the previous emitted snapshot.
    last_ui: f64,
    ticks: u64,
    emitted: u64,
    clamped_dt: u64,
}

impl SimulationLoop {
    /// Start a fresh run at wall time `start_time` with phase 0.
    pub fn new(timing: TimingConfig, start_time: f64) -> Self {
        let start_time = if start_time.is_finite() { start_time } else { 0.0 };
        Self {
            timing,
            phase: 0.0,
            last_tick: start_time,
            last_ui: start_time,
            ticks: 0,
            emitted: 0,
            clamped_dt: 0,
        }
    }

    /// Advance one physics tick to wall time `now`.
    pub fn tick(&mut self, now: f64) -> Tick {
        let nominal = self.timing.physics_tick_s();

        // A non-finite clock reading counts as a NaN dt at the expected time.
        let (now, raw_dt) = if now.is_finite() {
            (now, now - self.last_tick)
        } else {
            (self.last_tick + nominal, f64::NAN)
        };

        self.last_tick = now;
        let dt = sanitize_dt(raw_dt, nominal, self.timing.max_dt_s);
        if dt.to_bits() != raw_dt.to_bits() {
            self.clamped_dt += 1;
            debug!("dt {:.6}s clamped to {:.3}s", raw_dt, dt);
        }

        self.phase = advance_phase(self.phase, dt);
        self.ticks += 1;

        let sample = physics::evaluate(self.phase, now);
        let segment = PhaseSegment::at(self.phase);

        // Clock went backwards: restart the UI interval from here.
        if now < self.last_ui {
            self.last_ui = now;
        }

        let snapshot = if now - self.last_ui >= self.timing.ui_tick_s() {
            self.last_ui = now;
            self.emitted += 1;
            Some(Snapshot::rounded(&sample))
        } else {
            None
        };

        trace!(
            "tick {}: phase={:.3} {} rpm={:.1} tq={:.1}",
            self.ticks, self.phase, segment, sample.rpm, sample.torque_nm
        );

        Tick {
            phase: self.phase,
            segment,
            sample,
            snapshot,
        }
    }

    /// Current cycle phase.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Physics ticks performed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Snapshots produced by `tick` (the seed snapshot is not counted).
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Ticks whose dt had to be replaced.
    pub fn clamped_dt(&self) -> u64 {
        self.clamped_dt
    }
}
