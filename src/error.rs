//! Error types for the `framesift` crate.
//!
//! This module defines [`FrameSiftError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context (file
//! paths, output paths, upstream messages) to diagnose a failure without
//! additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framesift` operations.
///
/// Every public method that can fail returns `Result<T, FrameSiftError>`.
/// Per-frame and per-file failures are absorbed and logged by the pipelines;
/// only errors that make the whole session impossible (a missing input file,
/// a dead terminal) propagate out of the library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameSiftError {
    /// The video file could not be opened.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    ///
    /// Mid-stream decode failures during sequential reading are downgraded to
    /// end-of-stream by [`crate::VideoSource::read_next`]; this variant
    /// surfaces only from operations that must produce a frame, such as
    /// seeking.
    #[error("Failed to decode video frame: {0}")]
    DecodeError(String),

    /// A frame variant could not be written to disk.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// The output path that could not be written.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// The requested output image format is not supported.
    #[error("Unsupported frame format: {0}")]
    UnsupportedFormat(String),

    /// The display surface failed to render or report input.
    #[error("Display surface error: {0}")]
    Surface(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame encoding.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for FrameSiftError {
    fn from(error: FfmpegError) -> Self {
        FrameSiftError::DecodeError(error.to_string())
    }
}
