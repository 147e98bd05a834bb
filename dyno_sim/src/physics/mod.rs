//! Physics model.
//!
//! Pure functions of `(cycle_phase, wall_time)`. Nothing here holds state:
//! the stepper in [`crate::sim_loop`] owns the phase and feeds it in.

mod ambient;
mod engine;
mod segment;

pub use ambient::{Ambient, ambient, hold_power_factor, hold_rpm_jitter};
pub use engine::{lerp, power_ps, rpm_from_phase, smoothstep, speed_kmh, torque_from_rpm};
pub use segment::PhaseSegment;

use dyno_common::snapshot::Snapshot;

/// Evaluate the full model for one physics tick.
///
/// Returns the raw, unrounded reading with Hold-segment jitter applied.
/// `wall_time` is the clock time in seconds; jitter and ambient terms use it
/// directly so they do not restart with each lap.
pub fn evaluate(phase: f64, wall_time: f64) -> Snapshot {
    let mut rpm = rpm_from_phase(phase);
    let torque = torque_from_rpm(rpm);
    let mut power = power_ps(torque, rpm);
    let speed = speed_kmh(rpm);
    let amb = ambient(wall_time);

    if PhaseSegment::at(phase) == PhaseSegment::Hold {
        rpm += hold_rpm_jitter(wall_time);
        power *= hold_power_factor(wall_time);
    }

    Snapshot {
        speed_kmh: speed,
        rpm,
        torque_nm: torque,
        power_ps: power,
        din_factor_pct: amb.din_factor_pct,
        temperature_c: amb.temperature_c,
        pressure_hpa: amb.pressure_hpa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyno_common::consts::{IDLE_RPM, T_IDLE1, T_RAMP};

    #[test]
    fn test_evaluate_idle() {
        let s = evaluate(1.0, 0.0);
        assert_eq!(s.rpm, IDLE_RPM);
        assert_eq!(s.speed_kmh, 1500.0 / 12000.0 * 300.0);
        assert_eq!(s.torque_nm, 30.0);
        assert!((s.power_ps - 30.0 * 1500.0 / 7023.0).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_only_in_hold() {
        // Wall time where sin(2π·6·t) = 1.
        let t = 1.0 / 24.0;
        let phase_ramp = T_IDLE1 + T_RAMP * 0.5;
        assert_eq!(evaluate(phase_ramp, t).rpm, rpm_from_phase(phase_ramp));

        let phase_hold = T_IDLE1 + T_RAMP + 1.0;
        let s = evaluate(phase_hold, t);
        assert!((s.rpm - (rpm_from_phase(phase_hold) + 50.0)).abs() < 1e-6);

        let torque = torque_from_rpm(rpm_from_phase(phase_hold));
        let base_power = power_ps(torque, rpm_from_phase(phase_hold));
        assert!((s.power_ps / base_power - hold_power_factor(t)).abs() < 1e-12);
    }

    #[test]
    fn test_torque_uses_unjittered_rpm() {
        let phase_hold = T_IDLE1 + T_RAMP + 0.5;
        let s = evaluate(phase_hold, 1.0 / 24.0);
        assert_eq!(s.torque_nm, torque_from_rpm(rpm_from_phase(phase_hold)));
    }

    #[test]
    fn test_evaluate_is_finite_over_cycle() {
        let mut phase = 0.0;
        while phase < dyno_common::consts::CYCLE_T {
            assert!(evaluate(phase, phase * 7.3).is_finite());
            phase += 0.01;
        }
    }
}
