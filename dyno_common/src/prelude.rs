//! Prelude module for common re-exports.
//!
//! ```rust
//! use dyno_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig, SimulatorConfig, TimingConfig};

// ─── Measurements ───────────────────────────────────────────────────
pub use crate::metric::Metric;
pub use crate::snapshot::{Snapshot, round2};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_T, PHYSICS_TICK_MS, UI_TICK_MS};
