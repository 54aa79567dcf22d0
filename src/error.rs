//! Error types for the `framesift` crate.
//!
//! This module defines [`SiftError`], the unified error type returned by all
//! fallible operations in the crate. Variants carry enough context (paths,
//! range ids, counts) to diagnose a failed job without extra logging at the
//! call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framesift` operations.
///
/// Every public method that can fail returns `Result<T, SiftError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SiftError {
    /// The video source could not be opened.
    #[error("Failed to open video source at {path}: {reason}")]
    SourceOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The source does not contain a video stream.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    Decode(String),

    /// A second result was recorded for a range that already has one.
    ///
    /// Each range reports exactly once; a duplicate write is a programming
    /// error in the caller, not a recoverable state.
    #[error("Range {range_id} already has a recorded result")]
    DuplicateRange {
        /// The offending range id.
        range_id: usize,
    },

    /// A result was recorded for a range id the store has no slot for.
    #[error("Range {range_id} is out of bounds for a job with {worker_count} workers")]
    UnknownRange {
        /// The offending range id.
        range_id: usize,
        /// Number of slots the store was created with.
        worker_count: usize,
    },

    /// Fewer ranges reported results than the job expected.
    ///
    /// Raised by [`ResultStore::finalize`](crate::ResultStore::finalize);
    /// no partial output is ever produced.
    #[error("Job incomplete: {recorded} of {expected} ranges reported results")]
    IncompleteJob {
        /// Ranges that actually reported.
        recorded: usize,
        /// Ranges the job was partitioned into.
        expected: usize,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for SiftError {
    fn from(error: FfmpegError) -> Self {
        SiftError::Ffmpeg(error.to_string())
    }
}
