//! # framesift
//!
//! Sift a video for change — scan frames in parallel and keep only the
//! ones whose intensity differs from a reference, powered by FFmpeg via
//! the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! The sequence of source frames is partitioned into one contiguous range
//! per worker. Workers scan their ranges concurrently, each with its own
//! decoder, and the selected frames are reassembled in original temporal
//! order no matter which worker finishes first.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framesift::{NoOpObserver, SelectionConfig, VideoOpener, select_frames};
//!
//! let opener = VideoOpener::new("input.mp4");
//! let config = SelectionConfig::new(0.5).with_workers(4);
//!
//! let frames = select_frames(&opener, &config, &NoOpObserver)?;
//! for (position, frame) in frames.iter().enumerate() {
//!     frame.image.save(format!("frame{position}.jpg"))?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pieces
//!
//! - [`partition`] — split a frame count into disjoint per-worker ranges
//! - [`ChangeDetector`] — the per-range selection rule, with a selectable
//!   [`ReferencePolicy`]
//! - [`scan_range`] — drive one detector over one range of one source
//! - [`ResultStore`] — thread-safe slot array collecting per-range results
//! - [`select_frames`] — the whole job: partition, scan in parallel,
//!   reassemble
//! - [`VideoOpener`] / [`VideoSource`] — FFmpeg-backed decoding, one
//!   exclusively-owned source per worker
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
mod convert;
pub mod decode;
pub mod detector;
pub mod encode;
pub mod error;
pub mod frame;
pub mod observe;
pub mod partition;
pub mod pipeline;
pub mod store;
pub mod worker;

pub use config::{ProcessingMode, SelectionConfig};
pub use decode::{FrameSource, SourceOpener, VideoOpener, VideoSource};
pub use detector::{ChangeDetector, ReferencePolicy};
pub use error::SiftError;
pub use frame::Frame;
pub use observe::{NoOpObserver, SelectionObserver, WorkerReport};
pub use partition::{FrameRange, partition};
pub use pipeline::select_frames;
pub use store::{RangeResult, ResultStore};
pub use worker::scan_range;
