//! Frame image output.
//!
//! Selected frames are persisted as sequential image files named by their
//! zero-based position in the final sequence (`frame0.jpg`, `frame1.jpg`,
//! …). There is no index or manifest file; the filenames are the order.

use std::path::{Path, PathBuf};

use crate::{error::SiftError, frame::Frame};

/// Output path for the frame at `position` in the final sequence.
pub fn frame_path(destination: &Path, position: usize, extension: &str) -> PathBuf {
    destination.join(format!("frame{position}.{extension}"))
}

/// Encode one frame to `path`.
///
/// The image format is inferred from the path's extension by the `image`
/// crate.
pub fn write_frame(frame: &Frame, path: &Path) -> Result<(), SiftError> {
    frame.image.save(path)?;
    log::trace!("Wrote frame {} to {}", frame.index, path.display());
    Ok(())
}
