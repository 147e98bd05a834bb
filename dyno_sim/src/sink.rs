//! Snapshot consumers.
//!
//! The simulator pushes every snapshot into a [`SnapshotSink`] owned by the
//! run. Dispatching onto another execution context (a UI thread, a printer)
//! is the sink's job; the sinks here never block the tick loop.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dyno_common::snapshot::Snapshot;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Why a delivery did not reach the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The consumer has gone away (typically during shutdown).
    #[error("consumer disconnected")]
    Disconnected,

    /// The consumer is not keeping up; this snapshot was dropped.
    #[error("consumer queue full")]
    Full,

    /// The consumer refused the snapshot.
    #[error("snapshot rejected: {0}")]
    Rejected(String),
}

/// Anything that accepts snapshots.
pub trait SnapshotSink: Send {
    /// Hand one snapshot to the consumer.
    fn deliver(&mut self, snapshot: Snapshot) -> Result<(), SinkError>;
}

impl<F> SnapshotSink for F
where
    F: FnMut(Snapshot) -> Result<(), SinkError> + Send,
{
    fn deliver(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        self(snapshot)
    }
}

/// Non-blocking hand-off into a bounded channel.
///
/// A full queue drops the snapshot; a dropped receiver reports
/// `Disconnected`.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<Snapshot>,
}

impl ChannelSink {
    /// Create a sink and the receiving end with room for `capacity` snapshots.
    pub fn bounded(capacity: usize) -> (Self, Receiver<Snapshot>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl SnapshotSink for ChannelSink {
    fn deliver(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        self.tx.try_send(snapshot).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        })
    }
}

/// Latest reading, shared between the sink and any number of readers.
///
/// The simulator keeps no global state; a host that wants a "current
/// values" view registers one of these.
#[derive(Debug, Clone, Default)]
pub struct LatestReading {
    inner: Arc<RwLock<Option<Snapshot>>>,
}

impl LatestReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent snapshot, if any has arrived.
    pub fn get(&self) -> Option<Snapshot> {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl SnapshotSink for LatestReading {
    fn deliver(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| SinkError::Rejected("latest reading lock poisoned".to_string()))?;
        *guard = Some(snapshot);
        Ok(())
    }
}

/// Delivers each snapshot to several sinks in registration order.
///
/// Succeeds if at least one sink accepted the snapshot; otherwise returns
/// the last error.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register another sink.
    pub fn with(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of registered sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True if no sink is registered.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SnapshotSink for FanOut {
    fn deliver(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        let mut delivered = false;
        let mut last_err = SinkError::Disconnected;
        for sink in &mut self.sinks {
            match sink.deliver(snapshot) {
                Ok(()) => delivered = true,
                Err(e) => last_err = e,
            }
        }
        if delivered { Ok(()) } else { Err(last_err) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(rpm: f64) -> Snapshot {
        Snapshot {
            rpm,
            ..Snapshot::initial()
        }
    }

    #[test]
    fn test_channel_sink_delivers_in_order() {
        let (mut sink, rx) = ChannelSink::bounded(4);
        sink.deliver(snap(1.0)).unwrap();
        sink.deliver(snap(2.0)).unwrap();
        assert_eq!(rx.recv().unwrap().rpm, 1.0);
        assert_eq!(rx.recv().unwrap().rpm, 2.0);
    }

    #[test]
    fn test_channel_sink_full_and_disconnected() {
        let (mut sink, rx) = ChannelSink::bounded(1);
        sink.deliver(snap(1.0)).unwrap();
        assert_eq!(sink.deliver(snap(2.0)), Err(SinkError::Full));
        drop(rx);
        assert_eq!(sink.deliver(snap(3.0)), Err(SinkError::Disconnected));
    }

    #[test]
    fn test_latest_reading() {
        let latest = LatestReading::new();
        assert_eq!(latest.get(), None);

        let mut writer = latest.clone();
        writer.deliver(snap(1500.0)).unwrap();
        writer.deliver(snap(1600.0)).unwrap();
        assert_eq!(latest.get().map(|s| s.rpm), Some(1600.0));
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |s: Snapshot| -> Result<(), SinkError> {
                seen.push(s.rpm);
                Ok(())
            };
            sink.deliver(snap(7.0)).unwrap();
        }
        assert_eq!(seen, vec![7.0]);
    }

    #[test]
    fn test_fan_out() {
        let latest = LatestReading::new();
        let (chan, rx) = ChannelSink::bounded(1);
        let mut fan = FanOut::new().with(latest.clone()).with(chan);
        assert_eq!(fan.len(), 2);

        fan.deliver(snap(1.0)).unwrap();
        // Channel is now full but the latest reading still accepts.
        fan.deliver(snap(2.0)).unwrap();
        assert_eq!(latest.get().map(|s| s.rpm), Some(2.0));
        assert_eq!(rx.try_recv().unwrap().rpm, 1.0);
    }

    #[test]
    fn test_fan_out_all_failing() {
        let mut fan = FanOut::new()
            .with(|_s: Snapshot| -> Result<(), SinkError> { Err(SinkError::Rejected("no".into())) });
        assert_eq!(fan.deliver(snap(1.0)), Err(SinkError::Rejected("no".into())));
        assert!(FanOut::new().deliver(snap(1.0)).is_err());
    }
}
