//! Dyno Common Library
//!
//! Shared constants, configuration loading and the published measurement
//! record for the dyno simulator workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Cycle timing, engine curve and seed constants
//! - [`config`] - Configuration loading traits and types
//! - [`snapshot`] - The rounded seven-value `Snapshot` record
//! - [`metric`] - Catalog of the published metrics (key, name, unit, range)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use dyno_common::prelude::*;
//!
//! let s = Snapshot::initial();
//! assert_eq!(s.get(Metric::PressurehPa), 1012.0);
//! ```

pub mod config;
pub mod consts;
pub mod metric;
pub mod prelude;
pub mod snapshot;
