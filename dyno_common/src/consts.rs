//! Constants for the dyno simulator.
//!
//! Single source of truth for tick rates, the drive-cycle layout and the
//! engine curve parameters. Imported by all crates.

use static_assertions::const_assert;

// ─── Rates ──────────────────────────────────────────────────────────

/// Physics tick period in milliseconds (internal step).
pub const PHYSICS_TICK_MS: u64 = 10;

/// UI tick period in milliseconds (publish cadence, 20 Hz).
pub const UI_TICK_MS: u64 = 50;

/// A measured dt above this (seconds) is treated as a stall.
pub const MAX_DT_S: f64 = 0.2;

const_assert!(PHYSICS_TICK_MS > 0);
const_assert!(UI_TICK_MS >= PHYSICS_TICK_MS);

// ─── Drive cycle (seconds) ──────────────────────────────────────────

/// Idle before the sweep.
pub const T_IDLE1: f64 = 3.0;
/// Slow sweep up to redline.
pub const T_RAMP: f64 = 25.0;
/// Hold near the limiter.
pub const T_HOLD: f64 = 3.0;
/// Coast back down to idle.
pub const T_COAST: f64 = 12.0;
/// Idle after the coast.
pub const T_IDLE2: f64 = 3.0;

/// Full cycle length.
pub const CYCLE_T: f64 = T_IDLE1 + T_RAMP + T_HOLD + T_COAST + T_IDLE2;

const_assert!(CYCLE_T == 46.0);

// ─── Engine ─────────────────────────────────────────────────────────

/// Idle speed.
pub const IDLE_RPM: f64 = 1500.0;
/// Speed of peak torque.
pub const PEAK_RPM: f64 = 7500.0;
/// Limiter.
pub const REDLINE_RPM: f64 = 12000.0;

/// Road speed at redline (rpm maps linearly to km/h).
pub const VMAX_AT_REDLINE_KMH: f64 = 300.0;

/// Torque at idle (Nm).
pub const TORQUE_IDLE_NM: f64 = 30.0;
/// Maximum torque at `PEAK_RPM` (Nm).
pub const TORQUE_PEAK_NM: f64 = 120.0;
/// Relative torque drop from peak to redline.
pub const TOP_DROP_FRAC: f64 = 0.45;
/// Shape of the drop above peak.
pub const DROP_EXPONENT: f64 = 1.2;
/// Torque never falls below this fraction of `TORQUE_IDLE_NM`.
pub const TORQUE_FLOOR_FACTOR: f64 = 0.8;

/// `PS = Nm * rpm / PS_DIVISOR`.
pub const PS_DIVISOR: f64 = 7023.0;

const_assert!(IDLE_RPM < PEAK_RPM && PEAK_RPM < REDLINE_RPM);

// ─── Seed snapshot ──────────────────────────────────────────────────

/// DIN correction factor published on start (%).
pub const SEED_DIN_PCT: f64 = 100.0;
/// Temperature published on start (°C).
pub const SEED_TEMPERATURE_C: f64 = 22.0;
/// Pressure published on start (hPa).
pub const SEED_PRESSURE_HPA: f64 = 1012.0;

/// Default log-facing service name.
pub const DEFAULT_SERVICE_NAME: &str = "dyno-sim";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_durations_fill_cycle() {
        let sum = T_IDLE1 + T_RAMP + T_HOLD + T_COAST + T_IDLE2;
        assert_eq!(sum, CYCLE_T);
        assert_eq!(UI_TICK_MS % PHYSICS_TICK_MS, 0);
    }
}
