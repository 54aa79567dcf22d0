//! Worker progress observation.
//!
//! [`SelectionObserver`] is the injected logging capability of the core:
//! workers report their start and finish through it instead of writing to a
//! global sink, so callers can render progress however they like and tests
//! can substitute a capturing observer. Observations are advisory: nothing
//! in the data flow depends on them.

use std::time::Duration;

use crate::partition::FrameRange;

/// Summary of one worker's completed range scan.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    /// Id of the range the worker scanned.
    pub range_id: usize,
    /// Frames actually read from the source. May be less than the range
    /// length when the source ran out early.
    pub scanned: u64,
    /// Frames that passed change detection.
    pub selected: u64,
    /// Wall-clock time the scan took.
    pub elapsed: Duration,
}

/// Trait for receiving worker lifecycle events.
///
/// Implementations must be [`Send`] and [`Sync`] because events are emitted
/// from worker threads. Callbacks are infallible: they observe but cannot
/// influence the scan.
pub trait SelectionObserver: Send + Sync {
    /// Called when a worker begins scanning its range.
    fn worker_started(&self, range: &FrameRange);

    /// Called when a worker finishes its range, successfully or not short
    /// of the full length (source exhaustion shortens the yield).
    fn worker_finished(&self, report: &WorkerReport);
}

/// An observer that discards all events.
///
/// Pass this when no progress reporting is wanted.
#[derive(Debug, Default)]
pub struct NoOpObserver;

impl SelectionObserver for NoOpObserver {
    fn worker_started(&self, _range: &FrameRange) {}

    fn worker_finished(&self, _report: &WorkerReport) {}
}
