//! # Dyno Simulator Library
//!
//! Synthetic engine/dynamometer telemetry. A background thread advances a
//! 46 s drive cycle every physics tick and publishes a rounded seven-value
//! [`Snapshot`](dyno_common::snapshot::Snapshot) at the slower UI rate.
//!
//! # Module Structure
//!
//! - [`physics`] - Pure curve functions (rpm, torque, power, speed, ambient)
//! - [`sim_loop`] - Deterministic single-threaded stepper
//! - [`simulator`] - `Simulator` lifecycle and tick thread
//! - [`sink`] - Snapshot consumers
//! - [`clock`] - Injectable time sources
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         dyno_sim                                 │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │   Clock     │───►│  Simulator   │───►│  SnapshotSink       │  │
//! │  │ (mono/fake) │    │ (tick thread)│    │ (channel/latest/..) │  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────────┘  │
//! │                            │                                     │
//! │                            ▼                                     │
//! │                   ┌────────────────┐     ┌──────────────┐        │
//! │                   │ SimulationLoop │────►│   physics    │        │
//! │                   │ (phase, rates) │     │ (pure fns)   │        │
//! │                   └────────────────┘     └──────────────┘        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]

pub mod clock;
pub mod physics;
pub mod sim_loop;
pub mod simulator;
pub mod sink;

// Re-export key types for convenience
pub use crate::clock::{Clock, FakeClock, MonotonicClock};
pub use crate::sim_loop::{SimulationLoop, Tick};
pub use crate::simulator::{RunStats, SimError, Simulator};
pub use crate::sink::{ChannelSink, FanOut, LatestReading, SinkError, SnapshotSink};
