//! Thread-safe collection of per-range scan results.
//!
//! [`ResultStore`] is the single piece of shared mutable state in a
//! selection job. It is a fixed-size slot array indexed by range id: each
//! worker records its [`RangeResult`] into its own slot exactly once, and
//! [`finalize`](ResultStore::finalize) concatenates the slots in id order
//! once every worker has been joined. Because ranges are disjoint and slot
//! order equals range order, the concatenation is the selected subsequence
//! of the source in original temporal order, regardless of which worker
//! finished first.

use std::sync::{Mutex, PoisonError};

use crate::{error::SiftError, frame::Frame};

/// The frames one worker selected from its range, in source order.
#[derive(Debug, Clone)]
pub struct RangeResult {
    /// Id of the range these frames came from.
    pub range_id: usize,
    /// Selected frames, in increasing source-index order.
    pub frames: Vec<Frame>,
}

/// Capacity-fixed, mutex-guarded store of [`RangeResult`]s.
///
/// Created with the job's worker count; every range id in
/// `0..worker_count` has exactly one slot. Inserts are O(1) and the
/// completeness check at finalize time is a scan for empty slots.
#[derive(Debug)]
pub struct ResultStore {
    slots: Mutex<Vec<Option<RangeResult>>>,
}

impl ResultStore {
    /// Create a store expecting one result per range id in
    /// `0..worker_count`.
    pub fn new(worker_count: usize) -> Self {
        let mut slots = Vec::with_capacity(worker_count);
        slots.resize_with(worker_count, || None);
        Self {
            slots: Mutex::new(slots),
        }
    }

    /// Record one range's result.
    ///
    /// Safe to call concurrently from worker threads. Fails with
    /// [`SiftError::DuplicateRange`] if the slot already holds a result and
    /// [`SiftError::UnknownRange`] if the id has no slot.
    pub fn record(&self, result: RangeResult) -> Result<(), SiftError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let worker_count = slots.len();

        let Some(slot) = slots.get_mut(result.range_id) else {
            return Err(SiftError::UnknownRange {
                range_id: result.range_id,
                worker_count,
            });
        };

        if slot.is_some() {
            return Err(SiftError::DuplicateRange {
                range_id: result.range_id,
            });
        }

        *slot = Some(result);
        Ok(())
    }

    /// Number of ranges that have recorded a result so far.
    pub fn recorded(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Consume the store and concatenate all results in range-id order.
    ///
    /// Consuming `self` makes this a strictly post-join operation at the
    /// type level: no worker can still hold a reference to the store.
    /// If any slot is empty the whole job is invalid; the error carries
    /// the recorded/expected counts and no partial sequence is returned.
    pub fn finalize(self) -> Result<Vec<Frame>, SiftError> {
        let slots = self
            .slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let expected = slots.len();
        let recorded = slots.iter().filter(|slot| slot.is_some()).count();
        if recorded != expected {
            return Err(SiftError::IncompleteJob { recorded, expected });
        }

        let total: usize = slots
            .iter()
            .flatten()
            .map(|result| result.frames.len())
            .sum();
        let mut frames = Vec::with_capacity(total);
        for result in slots.into_iter().flatten() {
            frames.extend(result.frames);
        }

        Ok(frames)
    }
}
