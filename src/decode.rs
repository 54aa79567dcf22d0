//! Video decoding.
//!
//! [`VideoSource`] wraps an FFmpeg demuxer + decoder pair behind the small
//! [`FrameSource`] trait the scan core consumes: total frame count, seek,
//! and sequential [`read_next`](FrameSource::read_next). Each source owns
//! its demuxer and decoder exclusively; decoding is stateful, so a source
//! must never be shared between workers. [`SourceOpener`] is the
//! open-per-worker capability: every worker opens its own source and the
//! threads never alias a decode cursor.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{FrameSource, SourceOpener, VideoOpener};
//!
//! let opener = VideoOpener::new("input.mp4");
//! let mut source = opener.open()?;
//! while let Some(frame) = source.read_next()? {
//!     println!("frame {} intensity {:.1}", frame.index, frame.intensity());
//! }
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{convert, error::SiftError, frame::Frame};

/// A positionable, sequential producer of decoded frames.
///
/// The scan core is written against this trait so tests can substitute
/// scripted sources with known intensities; [`VideoSource`] is the real
/// implementation.
pub trait FrameSource {
    /// Total number of frames the source claims to contain.
    ///
    /// May be an estimate; [`read_next`](FrameSource::read_next) returning
    /// `None` is the authoritative end of stream.
    fn total_frames(&self) -> u64;

    /// Position the source so the next read returns `frame_number`.
    fn seek_to(&mut self, frame_number: u64) -> Result<(), SiftError>;

    /// Decode and return the next frame, or `None` at end of stream.
    fn read_next(&mut self) -> Result<Option<Frame>, SiftError>;
}

/// Capability to open an independent [`FrameSource`] per worker.
///
/// Implementations must be [`Sync`]: one opener is shared by reference
/// across worker threads, and each call to [`open`](SourceOpener::open)
/// must yield a source with its own decode cursor.
pub trait SourceOpener: Sync {
    /// The source type this opener produces.
    type Source: FrameSource;

    /// Open a fresh, exclusively-owned source.
    fn open(&self) -> Result<Self::Source, SiftError>;
}

/// Opens a [`VideoSource`] per worker by re-opening the file.
#[derive(Debug, Clone)]
pub struct VideoOpener {
    path: PathBuf,
}

impl VideoOpener {
    /// Create an opener for the given media path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path this opener reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceOpener for VideoOpener {
    type Source = VideoSource;

    fn open(&self) -> Result<VideoSource, SiftError> {
        VideoSource::open(&self.path)
    }
}

/// An FFmpeg-backed frame source.
///
/// Holds the demuxer context, the video decoder, and a lazily-created
/// RGB24 scaler. Frames come out as [`Frame`] values with tightly packed
/// 8-bit RGB pixel data at the source resolution.
pub struct VideoSource {
    input: Input,
    decoder: VideoDecoder,
    /// Created on the first decoded frame: the decoder's reported pixel
    /// format before decoding may differ from the real output.
    scaler: Option<ScalingContext>,
    stream_index: usize,
    time_base: Rational,
    frames_per_second: f64,
    total_frames: u64,
    width: u32,
    height: u32,
    /// Source index of the next frame a read should yield; decoded frames
    /// below this (keyframe pre-roll after a seek) are discarded.
    next_frame: u64,
    decoded: VideoFrame,
    scaled: VideoFrame,
    eof_sent: bool,
    finished: bool,
}

impl VideoSource {
    /// Open a video file for sequential decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its frame rate, dimensions, and frame
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::SourceOpen`] if the file cannot be opened and
    /// [`SiftError::NoVideoStream`] if it has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SiftError> {
        let path = path.as_ref();
        let owned_path = path.to_path_buf();

        log::debug!("Opening video source: {}", owned_path.display());

        ffmpeg_next::init().map_err(|error| SiftError::SourceOpen {
            path: owned_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| SiftError::SourceOpen {
            path: owned_path.clone(),
            reason: error.to_string(),
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(SiftError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();

        // Average frame rate, falling back to the raw rate field.
        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        // Prefer the container's frame count; estimate from the duration
        // when the container does not carry one.
        let total_frames = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            let duration_microseconds = input.duration();
            if duration_microseconds > 0 && frames_per_second > 0.0 {
                (duration_microseconds as f64 / 1_000_000.0 * frames_per_second) as u64
            } else {
                0
            }
        };

        let codec_parameters = stream.parameters();
        let decoder_context =
            CodecContext::from_parameters(codec_parameters).map_err(|error| {
                SiftError::SourceOpen {
                    path: owned_path.clone(),
                    reason: format!("Failed to read video codec parameters: {error}"),
                }
            })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| SiftError::SourceOpen {
                path: owned_path,
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let width = decoder.width();
        let height = decoder.height();

        Ok(Self {
            input,
            decoder,
            scaler: None,
            stream_index,
            time_base,
            frames_per_second,
            total_frames,
            width,
            height,
            next_frame: 0,
            decoded: VideoFrame::empty(),
            scaled: VideoFrame::empty(),
            eof_sent: false,
            finished: false,
        })
    }

    /// Source frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frames per second reported by the stream, or 0.0 if unknown.
    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    /// Scale and convert the current decoded frame to an [`RgbImage`].
    fn convert_current_frame(&mut self) -> Result<RgbImage, SiftError> {
        if self.scaler.is_none() {
            // Use the decoded frame's own format and size; the codec
            // parameters seen at open time can disagree with the real
            // decoder output.
            self.scaler = Some(ScalingContext::get(
                self.decoded.format(),
                self.decoded.width(),
                self.decoded.height(),
                Pixel::RGB24,
                self.width,
                self.height,
                ScalingFlags::BILINEAR,
            )?);
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded, &mut self.scaled)?;
        }

        let buffer = convert::frame_to_buffer(&self.scaled, self.width, self.height, 3);
        RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            SiftError::Decode("Failed to construct RGB image from decoded frame data".to_string())
        })
    }

    /// Frame number of the current decoded frame, derived from its PTS.
    fn current_frame_number(&self) -> u64 {
        if self.frames_per_second > 0.0 {
            let pts = self.decoded.pts().unwrap_or(0);
            convert::pts_to_frame_number(pts, self.time_base, self.frames_per_second)
        } else {
            // No usable rate information: number frames sequentially.
            self.next_frame
        }
    }
}

impl FrameSource for VideoSource {
    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Seek to the nearest keyframe at or before `frame_number`, then let
    /// [`read_next`](FrameSource::read_next) decode forward and discard the
    /// pre-roll. When the container refuses the seek the source falls back
    /// to a sequential skip through the same discard path.
    fn seek_to(&mut self, frame_number: u64) -> Result<(), SiftError> {
        if frame_number > 0 && self.frames_per_second > 0.0 {
            let timestamp =
                convert::frame_number_to_seek_timestamp(frame_number, self.frames_per_second);
            if self.input.seek(timestamp, ..timestamp).is_ok() {
                self.decoder.flush();
                self.eof_sent = false;
                self.finished = false;
            }
        }

        self.next_frame = frame_number;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Frame>, SiftError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            // Drain frames the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                let number = self.current_frame_number();
                if number < self.next_frame {
                    // Pre-roll between the seeked keyframe and the target.
                    continue;
                }

                let image = self.convert_current_frame()?;
                self.next_frame = number + 1;
                return Ok(Some(Frame::new(number, image)));
            }

            if self.eof_sent {
                self.finished = true;
                return Ok(None);
            }

            // Feed the decoder more packets.
            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        self.decoder
                            .send_packet(&packet)
                            .map_err(|error| SiftError::Decode(error.to_string()))?;
                    }
                    // Non-video packets are silently skipped.
                }
                Err(FfmpegError::Eof) => {
                    self.decoder
                        .send_eof()
                        .map_err(|error| SiftError::Decode(error.to_string()))?;
                    self.eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error — try the next packet.
                }
            }
        }
    }
}
