//! End-to-end selection pipeline tests.
//!
//! Uses scripted in-memory sources with known intensities so worker
//! scheduling, completion order, and fault behavior can be controlled
//! without fixture videos.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use framesift::{
    ChangeDetector, Frame, FrameRange, FrameSource, NoOpObserver, ReferencePolicy, RangeResult,
    SelectionConfig, SelectionObserver, SiftError, SourceOpener, WorkerReport, partition,
    select_frames,
};
use image::RgbImage;

/// A frame whose intensity equals `value` (1x1 image, lone red byte).
fn frame_with_value(index: u64, value: u8) -> Frame {
    Frame::new(index, RgbImage::from_raw(1, 1, vec![value, 0, 0]).unwrap())
}

/// In-memory frame source with scripted per-frame intensities.
///
/// An optional delay, keyed by seek target, stalls the worker that owns
/// the matching range, enough to force any completion order.
struct ScriptedSource {
    values: Arc<Vec<u8>>,
    claimed_total: u64,
    cursor: u64,
    delays: Arc<HashMap<u64, Duration>>,
    fail_at: Option<u64>,
}

impl FrameSource for ScriptedSource {
    fn total_frames(&self) -> u64 {
        self.claimed_total
    }

    fn seek_to(&mut self, frame_number: u64) -> Result<(), SiftError> {
        if let Some(delay) = self.delays.get(&frame_number) {
            thread::sleep(*delay);
        }
        self.cursor = frame_number;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Frame>, SiftError> {
        if let Some(fail_at) = self.fail_at
            && self.cursor == fail_at
        {
            return Err(SiftError::Decode("scripted decode fault".to_string()));
        }

        let index = self.cursor as usize;
        if index >= self.values.len() {
            return Ok(None);
        }

        self.cursor += 1;
        Ok(Some(frame_with_value(index as u64, self.values[index])))
    }
}

/// Opener handing every worker an independent scripted source.
struct ScriptedOpener {
    values: Arc<Vec<u8>>,
    claimed_total: Option<u64>,
    delays: Arc<HashMap<u64, Duration>>,
    fail_at: Option<u64>,
}

impl ScriptedOpener {
    fn new(values: Vec<u8>) -> Self {
        Self {
            values: Arc::new(values),
            claimed_total: None,
            delays: Arc::new(HashMap::new()),
            fail_at: None,
        }
    }

    fn with_delays(mut self, delays: HashMap<u64, Duration>) -> Self {
        self.delays = Arc::new(delays);
        self
    }

    fn with_claimed_total(mut self, total: u64) -> Self {
        self.claimed_total = Some(total);
        self
    }

    fn with_fail_at(mut self, frame_number: u64) -> Self {
        self.fail_at = Some(frame_number);
        self
    }
}

impl SourceOpener for ScriptedOpener {
    type Source = ScriptedSource;

    fn open(&self) -> Result<ScriptedSource, SiftError> {
        Ok(ScriptedSource {
            values: self.values.clone(),
            claimed_total: self
                .claimed_total
                .unwrap_or(self.values.len() as u64),
            cursor: 0,
            delays: self.delays.clone(),
            fail_at: self.fail_at,
        })
    }
}

fn selected_indices(frames: &[Frame]) -> Vec<u64> {
    frames.iter().map(|frame| frame.index).collect()
}

// ── Baseline equivalence ───────────────────────────────────────────

#[test]
fn single_worker_matches_a_sequential_detector_pass() {
    let values = vec![0_u8, 60, 10, 200, 199, 0, 255, 51, 50];
    let opener = ScriptedOpener::new(values.clone());
    let config = SelectionConfig::new(50.0);

    let frames = select_frames(&opener, &config, &NoOpObserver).unwrap();

    // The same rule applied once over the whole sequence.
    let mut detector = ChangeDetector::new(50.0, ReferencePolicy::Fixed);
    let expected: Vec<u64> = values
        .iter()
        .enumerate()
        .filter(|(_, &value)| detector.observe(f64::from(value)))
        .map(|(index, _)| index as u64)
        .collect();

    assert_eq!(selected_indices(&frames), expected);
    assert_eq!(selected_indices(&frames), vec![1, 3, 4, 6, 7]);
}

#[test]
fn fixed_policy_output_is_independent_of_worker_count() {
    let values: Vec<u8> = (0..60).map(|i| if i % 3 == 0 { 200 } else { 10 }).collect();

    let baseline = select_frames(
        &ScriptedOpener::new(values.clone()),
        &SelectionConfig::new(50.0),
        &NoOpObserver,
    )
    .unwrap();

    for workers in [2, 3, 4, 7] {
        let frames = select_frames(
            &ScriptedOpener::new(values.clone()),
            &SelectionConfig::new(50.0).with_workers(workers),
            &NoOpObserver,
        )
        .unwrap();
        assert_eq!(
            selected_indices(&frames),
            selected_indices(&baseline),
            "output must not depend on the partition (workers={workers})"
        );
    }
}

// ── Determinism under completion order ─────────────────────────────

#[test]
fn completion_order_does_not_affect_output_order() {
    let values: Vec<u8> = (0..40).map(|i| if i % 2 == 0 { 255 } else { 0 }).collect();
    let workers = 4;
    let config = SelectionConfig::new(50.0).with_workers(workers);

    // Stall earlier ranges longer than later ones, inverting the natural
    // completion order.
    let mut delays = HashMap::new();
    for range in partition(values.len() as u64, workers) {
        let stall = 25 * (workers as u64 - range.id as u64 - 1);
        delays.insert(range.start, Duration::from_millis(stall));
    }

    let inverted = select_frames(
        &ScriptedOpener::new(values.clone()).with_delays(delays),
        &config,
        &NoOpObserver,
    )
    .unwrap();
    let natural = select_frames(&ScriptedOpener::new(values), &config, &NoOpObserver).unwrap();

    assert_eq!(selected_indices(&inverted), selected_indices(&natural));

    let indices = selected_indices(&inverted);
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    assert_eq!(indices, sorted, "output must be in source order");
}

// ── Range-boundary semantics ───────────────────────────────────────

#[test]
fn range_boundaries_reset_the_reference() {
    // With EveryFrame tracking, only the first of four identical frames
    // clears the window... per range. Two ranges, two kept frames.
    let values = vec![100_u8, 100, 100, 100];

    let single = select_frames(
        &ScriptedOpener::new(values.clone()),
        &SelectionConfig::new(10.0).with_reference_policy(ReferencePolicy::EveryFrame),
        &NoOpObserver,
    )
    .unwrap();
    assert_eq!(selected_indices(&single), vec![0]);

    let split = select_frames(
        &ScriptedOpener::new(values),
        &SelectionConfig::new(10.0)
            .with_workers(2)
            .with_reference_policy(ReferencePolicy::EveryFrame),
        &NoOpObserver,
    )
    .unwrap();
    assert_eq!(
        selected_indices(&split),
        vec![0, 2],
        "each range starts from a fresh reference of 0"
    );
}

// ── Edge cases ─────────────────────────────────────────────────────

#[test]
fn empty_input_yields_empty_output() {
    let opener = ScriptedOpener::new(Vec::new());
    let config = SelectionConfig::new(0.5).with_workers(3);

    let frames = select_frames(&opener, &config, &NoOpObserver).unwrap();
    assert!(frames.is_empty());
}

#[test]
fn more_workers_than_frames_is_not_an_error() {
    let values = vec![200_u8, 0, 200];
    let opener = ScriptedOpener::new(values);
    let config = SelectionConfig::new(50.0).with_workers(8);

    let frames = select_frames(&opener, &config, &NoOpObserver).unwrap();
    assert_eq!(selected_indices(&frames), vec![0, 2]);
}

#[test]
fn source_exhaustion_shortens_the_range_yield() {
    // The source claims 12 frames but only delivers 8; the last range
    // scans nothing and the job still completes.
    let values: Vec<u8> = vec![255; 8];
    let opener = ScriptedOpener::new(values).with_claimed_total(12);
    let config = SelectionConfig::new(50.0).with_workers(3);

    let frames = select_frames(&opener, &config, &NoOpObserver).unwrap();
    assert_eq!(selected_indices(&frames), (0..8).collect::<Vec<_>>());
}

// ── Failure ────────────────────────────────────────────────────────

#[test]
fn worker_fault_surfaces_as_incomplete_job() {
    let values: Vec<u8> = vec![255; 20];
    // Frame 7 lives in range 1 of a 4-way split (5 frames per range).
    let opener = ScriptedOpener::new(values).with_fail_at(7);
    let config = SelectionConfig::new(50.0).with_workers(4);

    let error = select_frames(&opener, &config, &NoOpObserver).unwrap_err();
    match error {
        SiftError::IncompleteJob { recorded, expected } => {
            assert_eq!(recorded, 3);
            assert_eq!(expected, 4);
        }
        other => panic!("Expected IncompleteJob, got: {other}"),
    }
}

// ── Observation ────────────────────────────────────────────────────

struct RecordingObserver {
    started: Mutex<Vec<FrameRange>>,
    finished: Mutex<Vec<WorkerReport>>,
}

impl RecordingObserver {
    fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
        }
    }
}

impl SelectionObserver for RecordingObserver {
    fn worker_started(&self, range: &FrameRange) {
        self.started.lock().unwrap().push(*range);
    }

    fn worker_finished(&self, report: &WorkerReport) {
        self.finished.lock().unwrap().push(report.clone());
    }
}

#[test]
fn every_worker_reports_start_and_finish() {
    let values: Vec<u8> = (0..9).map(|i| i * 20).collect();
    let opener = ScriptedOpener::new(values);
    let config = SelectionConfig::new(50.0).with_workers(3);
    let observer = RecordingObserver::new();

    let frames = select_frames(&opener, &config, &observer).unwrap();

    let started = observer.started.lock().unwrap();
    let finished = observer.finished.lock().unwrap();
    assert_eq!(started.len(), 3);
    assert_eq!(finished.len(), 3);

    let scanned: u64 = finished.iter().map(|report| report.scanned).sum();
    assert_eq!(scanned, 9, "every frame is scanned exactly once");

    let selected: u64 = finished.iter().map(|report| report.selected).sum();
    assert_eq!(selected, frames.len() as u64);

    let mut ids: Vec<usize> = finished.iter().map(|report| report.range_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2]);
}

// ── RangeResult shape ──────────────────────────────────────────────

#[test]
fn scan_range_preserves_intra_range_order() {
    use framesift::scan_range;

    let values = vec![0_u8, 200, 0, 200, 200];
    let opener = ScriptedOpener::new(values);
    let mut source = opener.open().unwrap();

    let range = FrameRange {
        id: 0,
        start: 1,
        length: 4,
    };
    let config = SelectionConfig::new(50.0);

    let RangeResult { range_id, frames } =
        scan_range(&mut source, &range, &config, &NoOpObserver).unwrap();

    assert_eq!(range_id, 0);
    assert_eq!(selected_indices(&frames), vec![1, 3, 4]);
}
