//! The decoded frame type.

use image::RgbImage;

/// One decoded video frame, tagged with its position in the source sequence.
///
/// Frames are produced by a [`FrameSource`](crate::FrameSource) and never
/// mutated afterwards. The pixel data is a tightly packed 8-bit RGB image.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based position of this frame in the original sequence.
    pub index: u64,
    /// Decoded pixel data.
    pub image: RgbImage,
}

impl Frame {
    /// Create a frame from its source index and pixel data.
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self { index, image }
    }

    /// Mean summed channel value over all pixels.
    ///
    /// Sums R+G+B over every pixel and divides by the pixel count, yielding
    /// a single scalar in `0.0..=765.0` for 8-bit RGB. This is the quantity
    /// the [`ChangeDetector`](crate::ChangeDetector) compares against its
    /// reference. An empty image has intensity 0.
    pub fn intensity(&self) -> f64 {
        let pixels = u64::from(self.image.width()) * u64::from(self.image.height());
        if pixels == 0 {
            return 0.0;
        }

        let sum: u64 = self.image.as_raw().iter().map(|&value| u64::from(value)).sum();
        sum as f64 / pixels as f64
    }
}
