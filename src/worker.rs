//! Per-range scan execution.
//!
//! [`scan_range`] is the body of one worker: position an exclusively-owned
//! source at the range start, drive a fresh [`ChangeDetector`] over at most
//! `range.length` frames, and produce the range's [`RangeResult`]. The
//! detector is created here so every range starts from a clean reference.

use std::time::Instant;

use crate::{
    config::SelectionConfig,
    decode::FrameSource,
    detector::ChangeDetector,
    error::SiftError,
    observe::{SelectionObserver, WorkerReport},
    partition::FrameRange,
    store::RangeResult,
};

/// Scan one range of frames and collect the selected ones.
///
/// The source must be owned exclusively by this call, since decoding is
/// stateful. Reads stop at `range.length` frames or at end of stream,
/// whichever comes first; running out of frames early is not an error, it
/// just shortens the range's yield. Empty ranges skip the seek entirely
/// and return an empty result.
///
/// Start and finish events go to `observer`; the finish report carries the
/// scanned count, selected count, and elapsed wall time.
pub fn scan_range<S: FrameSource>(
    source: &mut S,
    range: &FrameRange,
    config: &SelectionConfig,
    observer: &dyn SelectionObserver,
) -> Result<RangeResult, SiftError> {
    observer.worker_started(range);
    log::debug!(
        "Worker {} scanning {} frames from index {}",
        range.id,
        range.length,
        range.start
    );

    let started = Instant::now();
    let mut detector = ChangeDetector::new(config.threshold, config.reference_policy);
    let mut selected = Vec::new();
    let mut scanned: u64 = 0;

    if !range.is_empty() {
        source.seek_to(range.start)?;

        while scanned < range.length {
            let Some(frame) = source.read_next()? else {
                // Source exhausted before the nominal range end.
                break;
            };
            scanned += 1;

            if detector.observe(frame.intensity()) {
                selected.push(frame);
            }
        }
    }

    let report = WorkerReport {
        range_id: range.id,
        scanned,
        selected: selected.len() as u64,
        elapsed: started.elapsed(),
    };
    observer.worker_finished(&report);
    log::debug!(
        "Worker {} finished in {:.3}s: {} of {} frames selected",
        report.range_id,
        report.elapsed.as_secs_f64(),
        report.selected,
        report.scanned
    );

    Ok(RangeResult {
        range_id: range.id,
        frames: selected,
    })
}
