//! Selection job configuration.
//!
//! [`SelectionConfig`] is a small builder that carries the tuning knobs of
//! a selection job (threshold, worker count, reference policy) through
//! [`select_frames`](crate::select_frames) without polluting every function
//! signature.
//!
//! # Example
//!
//! ```
//! use framesift::{ReferencePolicy, SelectionConfig};
//!
//! let config = SelectionConfig::new(0.5)
//!     .with_workers(4)
//!     .with_reference_policy(ReferencePolicy::EveryFrame);
//! assert_eq!(config.workers, 4);
//! ```

use crate::detector::ReferencePolicy;

/// Processing mode flag.
///
/// Carried through from the CLI for forward compatibility; no current
/// behavior depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Mode 0. The default.
    #[default]
    Standard,
    /// Mode 1. Reserved.
    Alternate,
}

/// Configuration for one selection job.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Change-detection threshold. A frame is kept when its intensity is
    /// strictly more than this far from the reference.
    pub threshold: f64,
    /// Number of worker threads; also the number of ranges the sequence is
    /// partitioned into. Always at least 1.
    pub workers: usize,
    /// Reserved processing mode.
    pub mode: ProcessingMode,
    /// How the reference intensity evolves during a range scan.
    pub reference_policy: ReferencePolicy,
}

impl SelectionConfig {
    /// Create a configuration with the given threshold.
    ///
    /// Defaults: 1 worker, [`ProcessingMode::Standard`],
    /// [`ReferencePolicy::Fixed`].
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            workers: 1,
            mode: ProcessingMode::default(),
            reference_policy: ReferencePolicy::default(),
        }
    }

    /// Set the worker count. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the reserved processing mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the reference-update policy.
    #[must_use]
    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }
}
