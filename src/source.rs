//! Video frame sources.
//!
//! [`FrameSource`] is the decode abstraction the playback controller and the
//! batch pipeline are written against: sequential reads, clamped
//! random-access seeks, and cached metadata. [`VideoSource`] is the
//! production implementation, wrapping an FFmpeg demux + decode session via
//! the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate. Frames
//! come out as [`image::DynamicImage`] values in RGB8 at the source
//! resolution.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{FrameSource, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! while let Some(frame) = source.read_next()? {
//!     println!("decoded frame {}", frame.index);
//! }
//! # Ok::<(), framesift::FrameSiftError>(())
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
use image::{DynamicImage, RgbImage};

use crate::{
    error::FrameSiftError,
    metadata::{FrameCountStrategy, VideoMetadata},
    utilities,
};

/// One decoded still frame.
///
/// Transient by design: a frame lives between its decode and the next
/// decode or export call. The playback controller retains only the single
/// frame currently on screen so that saving never re-decodes.
pub struct DecodedFrame {
    /// Position of this frame in the stream, counted from zero.
    pub index: u64,
    /// The raster snapshot, RGB8 at source resolution.
    pub image: DynamicImage,
}

/// Sequential + random-access decode of a video.
///
/// The contract the interactive player and the batch pipeline rely on:
///
/// - `read_next` advances the cursor by one and reports end-of-stream as
///   `Ok(None)`; mid-stream decode failures are downgraded to end-of-stream.
/// - `seek` clamps the requested index into the valid range before jumping;
///   after a seek the next `read_next` continues from `index + 1`.
pub trait FrameSource {
    /// Cached metadata for the opened stream.
    fn metadata(&self) -> &VideoMetadata;

    /// Decode the next frame, or `Ok(None)` at end of stream.
    fn read_next(&mut self) -> Result<Option<DecodedFrame>, FrameSiftError>;

    /// Jump to `index` (clamped to the valid range) and decode that frame.
    fn seek(&mut self, index: u64) -> Result<DecodedFrame, FrameSiftError>;
}

/// An FFmpeg-backed [`FrameSource`] bound to one file.
///
/// Owns the demuxer, the video decoder, and the RGB conversion context
/// exclusively; nothing else in the process touches the decode session, so
/// no locking is needed between the main loop and the surface watcher.
pub struct VideoSource {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    time_base: Rational,
    metadata: VideoMetadata,
    path: PathBuf,
    /// Index the next sequential read will produce.
    next_index: u64,
    decoded: VideoFrame,
    scaled: VideoFrame,
    eof_sent: bool,
    finished: bool,
}

impl VideoSource {
    /// Open a video file with the default (container-reported) frame-count
    /// strategy.
    ///
    /// # Errors
    ///
    /// - [`FrameSiftError::FileOpen`] if the path does not exist or the
    ///   container cannot be read. Open failures are fatal to the caller —
    ///   a missing or corrupt file cannot self-heal, so there is no retry.
    /// - [`FrameSiftError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameSiftError> {
        Self::open_with(path, FrameCountStrategy::Reported)
    }

    /// Open a video file, selecting how the total frame count is obtained.
    ///
    /// [`FrameCountStrategy::ScanAndCount`] decodes the whole stream once on
    /// a throwaway session before the real open, yielding an exact count at
    /// O(n) one-time cost. The interactive player uses it so stepping has a
    /// reliable upper clamp; batch extraction opts in via `--count-frames`.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        strategy: FrameCountStrategy,
    ) -> Result<Self, FrameSiftError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(FrameSiftError::FileOpen {
                path,
                reason: "No such file or directory".to_string(),
            });
        }

        // Safe to call repeatedly.
        ffmpeg_next::init().map_err(|error| FrameSiftError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        log::debug!("Opening video: {}", path.display());

        let input =
            ffmpeg_next::format::input(&path).map_err(|error| FrameSiftError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(FrameSiftError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();

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

        let frame_count = match strategy {
            FrameCountStrategy::Reported => {
                let duration_microseconds = input.duration();
                if duration_microseconds > 0 && frames_per_second > 0.0 {
                    let seconds = duration_microseconds as f64 / 1_000_000.0;
                    Some((seconds * frames_per_second) as u64)
                } else {
                    None
                }
            }
            FrameCountStrategy::ScanAndCount => Some(scan_and_count(&path)?),
        };

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            count_strategy: strategy,
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.2} fps, {} frames",
            path.display(),
            width,
            height,
            frames_per_second,
            metadata
                .frame_count
                .map_or_else(|| "?".to_string(), |count| count.to_string()),
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            metadata,
            path,
            next_index: 0,
            decoded: VideoFrame::empty(),
            scaled: VideoFrame::empty(),
            eof_sent: false,
            finished: false,
        })
    }

    /// The path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the decode session.
    ///
    /// Dropping the source has the same effect; taking `self` by value makes
    /// release idempotent by construction. Abrupt termination paths (watcher
    /// exit, quit) skip this deliberately — the process is exiting anyway.
    pub fn close(self) {}

    /// Convert the frame currently held in `self.scaled` slot.
    fn convert_decoded(&mut self) -> Result<DynamicImage, FrameSiftError> {
        self.scaler.run(&self.decoded, &mut self.scaled)?;

        let width = self.metadata.width;
        let height = self.metadata.height;
        let buffer = utilities::frame_to_rgb_buffer(&self.scaled, width, height);
        let rgb = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FrameSiftError::DecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(rgb))
    }
}

impl FrameSource for VideoSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Decode the next frame in stream order.
    ///
    /// Failure policy: any mid-stream read or decode error is logged and
    /// reported as end-of-stream. The session stops; it does not crash.
    fn read_next(&mut self) -> Result<Option<DecodedFrame>, FrameSiftError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            // Drain frames the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                let image = match self.convert_decoded() {
                    Ok(image) => image,
                    Err(error) => {
                        log::warn!("Frame conversion failed, treating as end of stream: {error}");
                        self.finished = true;
                        return Ok(None);
                    }
                };
                let index = self.next_index;
                self.next_index += 1;
                return Ok(Some(DecodedFrame { index, image }));
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
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            log::warn!("Decode failed, treating as end of stream: {error}");
                            self.finished = true;
                            return Ok(None);
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if self.decoder.send_eof().is_err() {
                        self.finished = true;
                        return Ok(None);
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    log::warn!("Packet read failed, treating as end of stream: {error}");
                    self.finished = true;
                    return Ok(None);
                }
            }
        }
    }

    /// Jump to a frame by index.
    ///
    /// The index is clamped to `[0, frame_count - 1]` when the count is
    /// known, so out-of-range requests land on the nearest valid frame
    /// instead of erroring. Seeks to the nearest keyframe before the target,
    /// then decodes forward on a fresh decoder until the target is reached.
    fn seek(&mut self, index: u64) -> Result<DecodedFrame, FrameSiftError> {
        let target = match self.metadata.last_frame_index() {
            Some(last) => index.min(last),
            None => index,
        };

        let fps = self.metadata.frames_per_second;
        let timestamp = utilities::frame_index_to_stream_timestamp(target, fps, self.time_base);
        self.input.seek(timestamp, ..timestamp)?;

        // A fresh decoder drops all state buffered before the jump.
        let stream = self
            .input
            .stream(self.stream_index)
            .ok_or(FrameSiftError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        self.decoder = decoder_context.decoder().video()?;
        self.eof_sent = false;
        self.finished = false;

        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                let pts = self.decoded.pts().unwrap_or(0);
                let current = utilities::pts_to_frame_index(pts, self.time_base, fps);

                // Landing past the target means the exact index does not
                // exist in the stream; the closest following frame stands in.
                if current >= target {
                    let image = self.convert_decoded()?;
                    self.next_index = target + 1;
                    return Ok(DecodedFrame {
                        index: target,
                        image,
                    });
                }
                continue;
            }

            if self.eof_sent {
                break;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(FrameSiftError::DecodeError(format!(
            "Could not locate frame {target} in the video stream"
        )))
    }
}

/// Count frames by decoding the whole stream once on a throwaway session.
///
/// The fallback for containers that report no usable duration, and the
/// exact-count option for callers that need a reliable upper bound. Read
/// errors end the count early, consistent with the end-of-stream policy.
fn scan_and_count(path: &Path) -> Result<u64, FrameSiftError> {
    let mut input =
        ffmpeg_next::format::input(&path).map_err(|error| FrameSiftError::FileOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

    let stream = input
        .streams()
        .best(Type::Video)
        .ok_or(FrameSiftError::NoVideoStream)?;
    let stream_index = stream.index();
    let decoder_context = CodecContext::from_parameters(stream.parameters())?;
    let mut decoder = decoder_context.decoder().video()?;

    log::debug!("Counting frames by full scan: {}", path.display());

    let mut count: u64 = 0;
    let mut frame = VideoFrame::empty();
    let mut eof_sent = false;

    loop {
        while decoder.receive_frame(&mut frame).is_ok() {
            count += 1;
        }

        if eof_sent {
            break;
        }

        let mut packet = Packet::empty();
        match packet.read(&mut input) {
            Ok(()) => {
                if packet.stream() == stream_index && decoder.send_packet(&packet).is_err() {
                    break;
                }
            }
            Err(FfmpegError::Eof) => {
                if decoder.send_eof().is_err() {
                    break;
                }
                eof_sent = true;
            }
            Err(_) => break,
        }
    }

    log::debug!("Counted {count} frames in {}", path.display());
    Ok(count)
}
