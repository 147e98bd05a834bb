//! Published measurement record.
//!
//! A `Snapshot` is produced once per UI tick. All seven values are rounded
//! exactly once, when the snapshot is built, so every consumer sees the same
//! numbers.

use crate::consts::{SEED_DIN_PCT, SEED_PRESSURE_HPA, SEED_TEMPERATURE_C};
use crate::metric::Metric;
use serde::{Deserialize, Serialize};

/// Round to two decimals, half away from zero (`0.005 -> 0.01`).
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One self-consistent set of the seven published measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Road speed (km/h).
    pub speed_kmh: f64,
    /// Engine speed.
    pub rpm: f64,
    /// Torque (Nm).
    pub torque_nm: f64,
    /// Power (PS).
    pub power_ps: f64,
    /// DIN correction factor (%).
    pub din_factor_pct: f64,
    /// Ambient temperature (°C).
    pub temperature_c: f64,
    /// Ambient pressure (hPa).
    pub pressure_hpa: f64,
}

impl Snapshot {
    /// Round every field of a raw reading.
    pub fn rounded(raw: &Snapshot) -> Self {
        Self {
            speed_kmh: round2(raw.speed_kmh),
            rpm: round2(raw.rpm),
            torque_nm: round2(raw.torque_nm),
            power_ps: round2(raw.power_ps),
            din_factor_pct: round2(raw.din_factor_pct),
            temperature_c: round2(raw.temperature_c),
            pressure_hpa: round2(raw.pressure_hpa),
        }
    }

    /// Seed values published once when a run starts.
    pub fn initial() -> Self {
        Self::rounded(&Snapshot {
            speed_kmh: 0.0,
            rpm: 0.0,
            torque_nm: 0.0,
            power_ps: 0.0,
            din_factor_pct: SEED_DIN_PCT,
            temperature_c: SEED_TEMPERATURE_C,
            pressure_hpa: SEED_PRESSURE_HPA,
        })
    }

    /// Read a single field by metric.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::SpeedKmh => self.speed_kmh,
            Metric::Rpm => self.rpm,
            Metric::TorqueNm => self.torque_nm,
            Metric::PowerPS => self.power_ps,
            Metric::DINFactorPct => self.din_factor_pct,
            Metric::TemperatureC => self.temperature_c,
            Metric::PressurehPa => self.pressure_hpa,
        }
    }

    /// True if every field is finite.
    pub fn is_finite(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_finite())
    }
}
