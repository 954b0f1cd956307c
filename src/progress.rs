//! Structured progress reporting for long runs.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    RunStarted { timestamps: usize },
    TimestampStarted { index: usize, timestamp: DateTime<Utc> },
    TimestampFinished { index: usize, timestamp: DateTime<Utc>, records: usize, cached: bool },
    RunFinished { records: usize },
}

/// Receives progress events. Must be callable from several threads when
/// timestamps are processed in parallel.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Forwards every event to `tracing`: run boundaries at `info`, per-timestamp
/// events at `debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { timestamps } => tracing::info!(timestamps, "shadow run started"),
            ProgressEvent::TimestampStarted { index, timestamp } => {
                tracing::debug!(index, %timestamp, "casting timestamp")
            },
            ProgressEvent::TimestampFinished { index, timestamp, records, cached } => {
                tracing::debug!(index, %timestamp, records, cached, "timestamp finished")
            },
            ProgressEvent::RunFinished { records } => tracing::info!(records, "shadow run finished"),
        }
    }
}

/// Counters for computed timestamps, cache hits and produced records.
#[derive(Debug, Default)]
pub struct CountingProgress {
    computed: AtomicUsize,
    cached: AtomicUsize,
    records: AtomicUsize,
}

impl CountingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn computed(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }

    pub fn cached(&self) -> usize {
        self.cached.load(Ordering::Relaxed)
    }

    pub fn records(&self) -> usize {
        self.records.load(Ordering::Relaxed)
    }
}

impl ProgressObserver for CountingProgress {
    fn on_event(&self, event: &ProgressEvent) {
        if let ProgressEvent::TimestampFinished { records, cached, .. } = event {
            let counter = if *cached { &self.cached } else { &self.computed };
            counter.fetch_add(1, Ordering::Relaxed);
            self.records.fetch_add(*records, Ordering::Relaxed);
        }
    }
}

/// Adapts a closure into an observer.
pub struct FnProgress<F>(pub F);

impl<F> ProgressObserver for FnProgress<F>
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        (self.0)(event)
    }
}
