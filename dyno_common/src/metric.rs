//! Catalog of the published metrics.
//!
//! Each metric has a stable key, a display name, a unit and a default
//! display range. Hosts use the catalog to label and scale values.

use serde::{Deserialize, Serialize};

/// One of the seven published measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Metric {
    /// Road speed.
    #[default]
    SpeedKmh,
    /// Engine speed.
    Rpm,
    /// Torque.
    TorqueNm,
    /// Power.
    PowerPS,
    /// DIN correction factor.
    DINFactorPct,
    /// Ambient temperature.
    TemperatureC,
    /// Ambient pressure.
    PressurehPa,
}

impl Metric {
    /// All metrics in publish order.
    pub const ALL: [Metric; 7] = [
        Metric::SpeedKmh,
        Metric::Rpm,
        Metric::TorqueNm,
        Metric::PowerPS,
        Metric::DINFactorPct,
        Metric::TemperatureC,
        Metric::PressurehPa,
    ];

    /// Stable key.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::SpeedKmh => "SpeedKmh",
            Metric::Rpm => "Rpm",
            Metric::TorqueNm => "TorqueNm",
            Metric::PowerPS => "PowerPS",
            Metric::DINFactorPct => "DINFactorPct",
            Metric::TemperatureC => "TemperatureC",
            Metric::PressurehPa => "PressurehPa",
        }
    }

    /// Name shown on the test-bench display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::SpeedKmh => "Geschwindigkeit",
            Metric::Rpm => "Motordrehzahl",
            Metric::TorqueNm => "Drehmoment",
            Metric::PowerPS => "Leistung",
            Metric::DINFactorPct => "DIN Faktor",
            Metric::TemperatureC => "Temperatur",
            Metric::PressurehPa => "Druck",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::SpeedKmh => "km/h",
            Metric::Rpm => "RPM",
            Metric::TorqueNm => "Nm",
            Metric::PowerPS => "PS",
            Metric::DINFactorPct => "%",
            Metric::TemperatureC => "°C",
            Metric::PressurehPa => "hPa",
        }
    }

    /// Default display range `(min, max)`.
    pub fn default_range(&self) -> (f64, f64) {
        match self {
            Metric::SpeedKmh => (0.0, 300.0),
            Metric::Rpm => (0.0, 15000.0),
            Metric::TorqueNm => (0.0, 1000.0),
            Metric::PowerPS => (0.0, 250.0),
            Metric::DINFactorPct => (90.0, 110.0),
            Metric::TemperatureC => (-10.0, 80.0),
            Metric::PressurehPa => (950.0, 1050.0),
        }
    }

    /// Case-insensitive lookup by key.
    pub fn find(key: &str) -> Option<Metric> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.key().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
