//! Slow ambient oscillators and limiter flutter.
//!
//! All functions here take absolute wall-clock seconds, not cycle phase, so
//! ambient drift and flutter carry on across laps instead of restarting.

use std::f64::consts::TAU;

/// Ambient conditions at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ambient {
    /// DIN correction factor (%), 100 ± 1.5.
    pub din_factor_pct: f64,
    /// Temperature (°C), 18..24.
    pub temperature_c: f64,
    /// Pressure (hPa), 1002..1014.
    pub pressure_hpa: f64,
}

/// `offset + amplitude · sin(2π·freq·t + phase)`
#[inline]
fn oscillate(offset: f64, amplitude: f64, freq_hz: f64, phase: f64, t: f64) -> f64 {
    offset + amplitude * (TAU * freq_hz * t + phase).sin()
}

/// Ambient conditions at wall time `t` (seconds).
pub fn ambient(t: f64) -> Ambient {
    Ambient {
        din_factor_pct: oscillate(100.0, 1.5, 0.01, 0.7, t),
        temperature_c: oscillate(21.0, 3.0, 0.006, 2.1, t),
        pressure_hpa: oscillate(1008.0, 6.0, 0.004, 3.2, t),
    }
}

/// Additive rpm flutter applied during Hold.
pub fn hold_rpm_jitter(t: f64) -> f64 {
    oscillate(0.0, 50.0, 6.0, 0.0, t)
}

/// Multiplicative power factor applied during Hold.
pub fn hold_power_factor(t: f64) -> f64 {
    oscillate(1.002, 0.002, 5.0, 0.5, t)
}
