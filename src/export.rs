//! Frame persistence.
//!
//! [`ExportSpec`] declares the output variants (formats × quality levels)
//! once; [`FrameExporter`] is the single place that iterates it, fanning one
//! decoded frame out to every variant under the deterministic names from
//! [`crate::naming`]. Writes are best-effort per variant: one failed file is
//! recorded and logged but never aborts its siblings.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{ExportSpec, FrameExporter, VideoSource, FrameSource};
//!
//! let spec = ExportSpec::from_options(&["png".into(), "jpg".into()], &[90, 95])?;
//! let exporter = FrameExporter::new("frames/clip", "clip", spec)?;
//!
//! let mut source = VideoSource::open("clip.mp4")?;
//! if let Some(frame) = source.read_next()? {
//!     let report = exporter.export(&frame);
//!     println!("wrote {} file(s)", report.written.len());
//! }
//! # Ok::<(), framesift::FrameSiftError>(())
//! ```

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::codecs::jpeg::JpegEncoder;

use crate::{error::FrameSiftError, naming::variant_file_name, source::DecodedFrame};

/// An output image format for exported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Lossless PNG. No quality axis.
    Png,
    /// Lossy JPEG. Carries one file per configured quality level.
    Jpeg,
}

impl ExportFormat {
    /// Parse a format from a file extension, with or without a leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    /// The file extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// The label embedded in quality-suffixed file names.
    pub fn quality_label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
        }
    }

    /// Whether this format fans out across quality levels.
    pub fn has_quality_axis(self) -> bool {
        matches!(self, ExportFormat::Jpeg)
    }
}

/// A declarative set of output variants: formats, and quality levels for the
/// formats that have a quality axis. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ExportSpec {
    variants: Vec<(ExportFormat, Option<Vec<u8>>)>,
}

impl ExportSpec {
    /// Build a spec from CLI-style options: a list of extensions and a list
    /// of quality levels applied to every quality-bearing format. Duplicate
    /// extensions collapse to one variant axis; an empty quality list
    /// defaults to `[95]`.
    ///
    /// # Errors
    ///
    /// [`FrameSiftError::UnsupportedFormat`] naming the offending extension
    /// when it maps to no supported format.
    pub fn from_options(
        extensions: &[String],
        qualities: &[u8],
    ) -> Result<Self, FrameSiftError> {
        let mut variants = Vec::with_capacity(extensions.len());
        for extension in extensions {
            let format = ExportFormat::from_extension(extension)
                .ok_or_else(|| FrameSiftError::UnsupportedFormat(extension.clone()))?;
            if variants.iter().any(|(existing, _)| *existing == format) {
                continue;
            }
            let qualities = if format.has_quality_axis() {
                let levels = if qualities.is_empty() {
                    vec![95]
                } else {
                    qualities.to_vec()
                };
                Some(levels)
            } else {
                None
            };
            variants.push((format, qualities));
        }
        Ok(Self { variants })
    }

    /// A spec producing exactly one file per frame in the given format.
    pub fn single(format: ExportFormat) -> Self {
        let qualities = format.has_quality_axis().then(|| vec![95]);
        Self {
            variants: vec![(format, qualities)],
        }
    }

    /// The number of files one frame fans out to.
    pub fn variant_count(&self) -> usize {
        self.variants
            .iter()
            .map(|(_, qualities)| qualities.as_ref().map_or(1, Vec::len))
            .sum()
    }

    /// Iterate the `(format, optional quality)` pairs in declaration order.
    pub fn variants(&self) -> impl Iterator<Item = (ExportFormat, Option<u8>)> + '_ {
        self.variants.iter().flat_map(|(format, qualities)| {
            match qualities {
                Some(levels) => levels.iter().map(|q| (*format, Some(*q))).collect::<Vec<_>>(),
                None => vec![(*format, None)],
            }
        })
    }
}

/// One variant that could not be written.
#[derive(Debug)]
pub struct ExportFailure {
    /// The path that failed.
    pub path: PathBuf,
    /// Why the write failed.
    pub error: FrameSiftError,
}

/// Outcome of exporting one frame: the paths written plus any per-variant
/// failures. A failure never aborts sibling variants of the same frame.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Paths written successfully, in variant order.
    pub written: Vec<PathBuf>,
    /// Variants that failed, with the reason.
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    /// True when every variant was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes decoded frames to disk according to an [`ExportSpec`].
///
/// Bound to one output directory and base name, typically the video's stem.
/// The directory (including intermediate segments) is created up front, so
/// the per-frame path is a pure function of the frame index.
pub struct FrameExporter {
    output_dir: PathBuf,
    base_name: String,
    spec: ExportSpec,
}

impl FrameExporter {
    /// Create an exporter, creating the output directory if needed.
    pub fn new<P: AsRef<Path>>(
        output_dir: P,
        base_name: impl Into<String>,
        spec: ExportSpec,
    ) -> Result<Self, FrameSiftError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            base_name: base_name.into(),
            spec,
        })
    }

    /// The spec this exporter fans frames out to.
    pub fn spec(&self) -> &ExportSpec {
        &self.spec
    }

    /// The path a given variant of a given frame will be written to.
    pub fn variant_path(
        &self,
        frame_index: u64,
        format: ExportFormat,
        quality: Option<u8>,
    ) -> PathBuf {
        self.output_dir
            .join(variant_file_name(&self.base_name, frame_index, format, quality))
    }

    /// Write every configured variant of one frame.
    ///
    /// Best-effort: each failed variant is logged (one line per variant) and
    /// recorded in the report while the remaining variants still get
    /// written. Existing files are overwritten — names are deterministic, so
    /// re-running an extraction converges on the same set of files.
    pub fn export(&self, frame: &DecodedFrame) -> ExportReport {
        let mut report = ExportReport::default();

        for (format, quality) in self.spec.variants() {
            let path = self.variant_path(frame.index, format, quality);
            match self.write_variant(frame, &path, format, quality) {
                Ok(()) => report.written.push(path),
                Err(error) => {
                    log::error!("Failed to write {}: {error}", path.display());
                    report.failures.push(ExportFailure { path, error });
                }
            }
        }

        report
    }

    fn write_variant(
        &self,
        frame: &DecodedFrame,
        path: &Path,
        format: ExportFormat,
        quality: Option<u8>,
    ) -> Result<(), FrameSiftError> {
        match (format, quality) {
            (ExportFormat::Jpeg, Some(level)) => {
                let file = File::create(path).map_err(|error| FrameSiftError::WriteFailed {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                })?;
                let writer = BufWriter::new(file);
                let encoder = JpegEncoder::new_with_quality(writer, level);
                frame.image.write_with_encoder(encoder)?;
            }
            (ExportFormat::Jpeg, None) => {
                frame.image.save_with_format(path, image::ImageFormat::Jpeg)?;
            }
            (ExportFormat::Png, _) => {
                frame.image.save_with_format(path, image::ImageFormat::Png)?;
            }
        }
        Ok(())
    }
}
