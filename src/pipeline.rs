//! Job orchestration.
//!
//! [`select_frames`] runs a whole selection job: probe the total frame
//! count, partition it into one range per worker, scan all ranges on a
//! fixed pool of OS threads, and reassemble the surviving frames in
//! original temporal order. Each worker opens its own source through the
//! [`SourceOpener`], so no decode state is ever shared between threads;
//! the only shared mutable structure is the mutex-guarded
//! [`ResultStore`](crate::ResultStore).
//!
//! Failure is all-or-nothing: a worker that errors or panics leaves its
//! slot empty, and the job surfaces that as
//! [`SiftError::IncompleteJob`] after the join barrier. No partial output
//! is ever returned.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{NoOpObserver, SelectionConfig, VideoOpener, select_frames};
//!
//! let opener = VideoOpener::new("input.mp4");
//! let config = SelectionConfig::new(0.5).with_workers(4);
//! let frames = select_frames(&opener, &config, &NoOpObserver)?;
//! println!("kept {} frames", frames.len());
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::thread;

use crate::{
    config::SelectionConfig,
    decode::{FrameSource, SourceOpener},
    error::SiftError,
    frame::Frame,
    observe::SelectionObserver,
    partition::partition,
    store::ResultStore,
    worker::scan_range,
};

/// Run a selection job and return the kept frames in source order.
///
/// Spawns exactly `config.workers` threads, one per range, and blocks
/// until every one has been joined. The returned sequence is deterministic
/// for a fixed input and worker count: output order depends only on range
/// ids, never on which thread finished first.
pub fn select_frames<O: SourceOpener>(
    opener: &O,
    config: &SelectionConfig,
    observer: &dyn SelectionObserver,
) -> Result<Vec<Frame>, SiftError> {
    let total_frames = opener.open()?.total_frames();
    let workers = config.workers.max(1);
    let ranges = partition(total_frames, workers);
    let store = ResultStore::new(workers);

    log::info!("Scanning {total_frames} frames across {workers} workers");

    thread::scope(|scope| {
        let store = &store;
        let mut handles = Vec::with_capacity(ranges.len());

        for range in &ranges {
            let handle = scope.spawn(move || -> Result<(), SiftError> {
                let mut source = opener.open()?;
                let result = scan_range(&mut source, range, config, observer)?;
                store.record(result)
            });
            handles.push((range.id, handle));
        }

        // Join-all barrier: nothing downstream runs while any worker is
        // outstanding. Worker failures are logged here and surface as a
        // completeness error at finalize.
        for (range_id, handle) in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(error)) => log::error!("Worker {range_id} failed: {error}"),
                Err(_) => log::error!("Worker {range_id} panicked"),
            }
        }
    });

    store.finalize()
}
