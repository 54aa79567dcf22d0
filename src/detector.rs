//! Per-range change detection.
//!
//! [`ChangeDetector`] decides, frame by frame, whether a frame differs
//! enough from a running reference intensity to be worth keeping. One
//! detector is created per range and discarded when the range's scan ends.
//! Ranges never share detector state, so a range boundary always resets
//! the reference.
//!
//! # Example
//!
//! ```
//! use framesift::{ChangeDetector, ReferencePolicy};
//!
//! let mut detector = ChangeDetector::new(10.0, ReferencePolicy::EveryFrame);
//! assert!(detector.observe(100.0)); // far from the initial reference of 0
//! assert!(!detector.observe(105.0)); // within 10 of the previous frame
//! ```

/// How the running reference intensity evolves as frames are scanned.
///
/// The reference starts at 0 for every range. What happens to it afterwards
/// was ambiguous in the tool this crate descends from, so the policy is an
/// explicit, selectable variant rather than a hard-coded choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// The reference is never updated.
    ///
    /// Every frame is compared against 0, so the threshold acts as an
    /// absolute-intensity cutoff. This is the default because it reproduces
    /// the original tool's output exactly.
    #[default]
    Fixed,
    /// The reference becomes the intensity of every scanned frame, making
    /// the scan a true frame-to-frame difference.
    EveryFrame,
    /// The reference becomes the intensity of the last *selected* frame, so
    /// each kept frame must differ from the previous kept one.
    OnSelect,
}

/// Stateful change detector for one range scan.
///
/// Frames must be fed in increasing source-index order via
/// [`observe`](ChangeDetector::observe).
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    threshold: f64,
    policy: ReferencePolicy,
    reference: f64,
}

impl ChangeDetector {
    /// Create a detector with the reference initialized to 0.
    pub fn new(threshold: f64, policy: ReferencePolicy) -> Self {
        Self {
            threshold,
            policy,
            reference: 0.0,
        }
    }

    /// The current reference intensity.
    pub fn reference(&self) -> f64 {
        self.reference
    }

    /// Feed the next frame's intensity; returns `true` if the frame is
    /// selected.
    ///
    /// A frame is selected iff its intensity lies strictly outside the
    /// closed window `[reference - threshold, reference + threshold]`. The
    /// window bounds themselves count as redundant: an intensity exactly
    /// `threshold` away from the reference is *not* selected.
    pub fn observe(&mut self, intensity: f64) -> bool {
        let selected = intensity < self.reference - self.threshold
            || intensity > self.reference + self.threshold;

        match self.policy {
            ReferencePolicy::Fixed => {}
            ReferencePolicy::EveryFrame => self.reference = intensity,
            ReferencePolicy::OnSelect => {
                if selected {
                    self.reference = intensity;
                }
            }
        }

        selected
    }
}
