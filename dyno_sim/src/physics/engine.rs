//! Engine curves: rpm over the cycle, torque over rpm, derived power/speed.
//!
//! - Ramp and Coast use smoothstep for a soft start and finish.
//! - Torque rises (smoothstep) to the peak, then falls as a power law.
//! - Power and speed are analytic derivations, not modelled separately.

use super::segment::PhaseSegment;
use dyno_common::consts::{
    DROP_EXPONENT, IDLE_RPM, PEAK_RPM, PS_DIVISOR, REDLINE_RPM, T_COAST, T_RAMP, TOP_DROP_FRAC,
    TORQUE_FLOOR_FACTOR, TORQUE_IDLE_NM, TORQUE_PEAK_NM, VMAX_AT_REDLINE_KMH,
};
use std::f64::consts::TAU;

/// Limiter breathing frequency during Hold (Hz).
const HOLD_BREATH_HZ: f64 = 1.6;
/// Hold oscillates in `[REDLINE_RPM - HOLD_DIP_RPM, REDLINE_RPM]`.
const HOLD_DIP_RPM: f64 = 60.0;

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// `u²(3 − 2u)` on the clamped input.
#[inline]
pub fn smoothstep(u: f64) -> f64 {
    let u = clamp01(u);
    u * u * (3.0 - 2.0 * u)
}

/// Engine speed at `phase` seconds into the cycle (no jitter).
pub fn rpm_from_phase(phase: f64) -> f64 {
    let (segment, t) = PhaseSegment::locate(phase);
    match segment {
        PhaseSegment::Idle1 | PhaseSegment::Idle2 => IDLE_RPM,
        PhaseSegment::Ramp => lerp(IDLE_RPM, REDLINE_RPM, smoothstep(t / T_RAMP)),
        PhaseSegment::Hold => {
            let half = HOLD_DIP_RPM * 0.5;
            REDLINE_RPM - HOLD_DIP_RPM + half * (1.0 + (TAU * HOLD_BREATH_HZ * t).sin())
        }
        PhaseSegment::Coast => lerp(REDLINE_RPM, IDLE_RPM, smoothstep(t / T_COAST)),
    }
}

/// Torque in Nm at `rpm`. Input is clamped to `[IDLE_RPM, REDLINE_RPM]`.
pub fn torque_from_rpm(rpm: f64) -> f64 {
    // NaN falls back to idle.
    let r = if rpm.is_nan() {
        IDLE_RPM
    } else {
        rpm.clamp(IDLE_RPM, REDLINE_RPM)
    };

    if r <= PEAK_RPM {
        let u = (r - IDLE_RPM) / (PEAK_RPM - IDLE_RPM).max(1.0);
        lerp(TORQUE_IDLE_NM, TORQUE_PEAK_NM, smoothstep(u))
    } else {
        let u = clamp01((r - PEAK_RPM) / (REDLINE_RPM - PEAK_RPM).max(1.0));
        let fall = u.powf(DROP_EXPONENT);
        let target = TORQUE_PEAK_NM * (1.0 - TOP_DROP_FRAC * fall);
        target.max(TORQUE_IDLE_NM * TORQUE_FLOOR_FACTOR)
    }
}

/// Power in PS from torque (Nm) and rpm.
#[inline]
pub fn power_ps(torque_nm: f64, rpm: f64) -> f64 {
    torque_nm * rpm / PS_DIVISOR
}

/// Road speed in km/h, linear in rpm.
#[inline]
pub fn speed_kmh(rpm: f64) -> f64 {
    (rpm / REDLINE_RPM) * VMAX_AT_REDLINE_KMH
}
