//! # Dyno Simulator Binary
//!
//! Runs the synthetic dyno cycle and prints every published snapshot to
//! stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Default rates, run until Ctrl-C
//! dyno_sim
//!
//! # Config file, 60 s, JSON lines
//! dyno_sim --config config/dyno.toml --duration 60 --json
//!
//! # Only engine speed, verbose logging
//! dyno_sim -m rpm -v
//! ```

#![deny(warnings)]

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use dyno_common::config::SimulatorConfig;
use dyno_common::metric::Metric;
use dyno_common::snapshot::Snapshot;
use dyno_sim::{ChannelSink, FanOut, LatestReading, Simulator};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Snapshots buffered between the tick thread and the printer.
const PRINT_QUEUE: usize = 64;

/// Dyno Simulator - synthetic engine test-bench telemetry
#[derive(Parser, Debug)]
#[command(name = "dyno_sim")]
#[command(version)]
#[command(about = "Synthetic dynamometer telemetry with decoupled physics and publish rates")]
#[command(long_about = None)]
struct Args {
    /// Path to simulator configuration (dyno.toml). Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many seconds (default: run until Ctrl-C)
    #[arg(short, long, value_name = "SECS")]
    duration: Option<f64>,

    /// Print only this metric (e.g. rpm, TorqueNm; case-insensitive)
    #[arg(short, long, value_name = "KEY")]
    metric: Option<String>,

    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        eprintln!("dyno_sim: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => SimulatorConfig::load_validated(path)?,
        None => SimulatorConfig::default(),
    };

    setup_tracing(&args, &config);
    info!("Dyno Simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    let metric = match args.metric.as_deref() {
        Some(key) => Some(Metric::find(key).ok_or_else(|| format!("unknown metric '{key}'"))?),
        None => None,
    };

    let deadline = match args.duration {
        Some(secs) => Some(deadline_after(secs)?),
        None => None,
    };

    let simulator = Simulator::new(&config)?;
    let timing = simulator.timing();
    info!(
        "Physics every {} ms, snapshots every {} ms, stall threshold {} s",
        timing.physics_tick_ms, timing.ui_tick_ms, timing.max_dt_s
    );
    let latest = LatestReading::new();
    let (printer, rx) = ChannelSink::bounded(PRINT_QUEUE);
    simulator.start(FanOut::new().with(printer).with(latest.clone()))?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!("Requested duration elapsed");
            break;
        }
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(snapshot) => print_snapshot(&snapshot, metric, args.json)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Some(stats) = simulator.stop_and_join() {
        info!(
            "Run finished: {} ticks, {} snapshots delivered, {} dropped",
            stats.ticks, stats.delivered, stats.dropped
        );
    }
    if let Some(last) = latest.get() {
        info!("Last reading: {}", format_text(&last, None));
    }

    info!("Dyno Simulator shutdown complete");
    Ok(())
}

/// Instant `secs` from now. Rejects non-positive, non-finite and
/// unrepresentable durations.
fn deadline_after(secs: f64) -> Result<Instant, String> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .and_then(|d| Instant::now().checked_add(d))
        .ok_or_else(|| format!("duration must be a positive number, got {secs}"))
}

fn print_snapshot(
    snapshot: &Snapshot,
    metric: Option<Metric>,
    json: bool,
) -> Result<(), serde_json::Error> {
    let line = match (json, metric) {
        (true, Some(m)) => serde_json::to_string(&serde_json::json!({
            "metric": m.key(),
            "value": snapshot.get(m),
            "unit": m.unit(),
        }))?,
        (true, None) => serde_json::to_string(snapshot)?,
        (false, m) => format_text(snapshot, m),
    };
    println!("{line}");
    Ok(())
}

/// `Name=value unit` pairs, or just the selected metric.
fn format_text(snapshot: &Snapshot, metric: Option<Metric>) -> String {
    match metric {
        Some(m) => format!("{} {:.2} {}", m.display_name(), snapshot.get(m), m.unit()),
        None => Metric::ALL
            .iter()
            .map(|m| format!("{}={:.2}{}", m.key(), snapshot.get(*m), m.unit()))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_after_accepts_positive() {
        let before = Instant::now();
        let deadline = deadline_after(1.5).unwrap();
        assert!(deadline >= before + Duration::from_millis(1500));
    }

    #[test]
    fn test_deadline_after_rejects_bad_values() {
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e300] {
            let err = deadline_after(secs).unwrap_err();
            assert!(err.starts_with("duration must be a positive number"), "{err}");
        }
    }

    #[test]
    fn test_format_text_single_metric() {
        let line = format_text(&Snapshot::initial(), Some(Metric::PressurehPa));
        assert!(line.contains("1012.00"), "{line}");
    }
}

/// Setup tracing subscriber from CLI arguments and config.
fn setup_tracing(args: &Args, config: &SimulatorConfig) {
    let level = if args.verbose {
        "debug"
    } else {
        config.shared.log_level.as_filter()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
