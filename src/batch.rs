//! Non-interactive batch extraction.
//!
//! [`BatchExtractor`] walks a source sequentially to end of stream, handing
//! every frame to a [`FrameExporter`]. No playback state, no surface, no
//! watcher. In directory mode each input file is processed to exhaustion and
//! released before the next one starts, and one file's decode failure aborts
//! only that file — the batch continues.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    error::FrameSiftError,
    export::{ExportSpec, FrameExporter},
    metadata::FrameCountStrategy,
    progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker, StopSignal},
    source::{FrameSource, VideoSource},
};

/// Result of a directory batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Files fully processed, with their extracted frame counts.
    pub completed: Vec<(PathBuf, u64)>,
    /// Files that could not be opened, with the error.
    pub failed: Vec<(PathBuf, FrameSiftError)>,
}

impl BatchSummary {
    /// Total frames extracted across the batch.
    pub fn total_frames(&self) -> u64 {
        self.completed.iter().map(|(_, frames)| frames).sum()
    }
}

/// Drives whole-stream extraction over one or many files.
pub struct BatchExtractor {
    output_root: PathBuf,
    spec: ExportSpec,
    count_strategy: FrameCountStrategy,
    progress: Arc<dyn ProgressCallback>,
    signal: StopSignal,
}

impl BatchExtractor {
    /// Create an extractor writing per-video subdirectories under
    /// `output_root`.
    pub fn new<P: AsRef<Path>>(output_root: P, spec: ExportSpec) -> Self {
        Self {
            output_root: output_root.as_ref().to_path_buf(),
            spec,
            count_strategy: FrameCountStrategy::Reported,
            progress: Arc::new(NoOpProgress),
            signal: StopSignal::new(),
        }
    }

    /// Select how each file's frame count is determined up front (the count
    /// only feeds progress display; extraction always runs to exhaustion).
    #[must_use]
    pub fn with_count_strategy(mut self, strategy: FrameCountStrategy) -> Self {
        self.count_strategy = strategy;
        self
    }

    /// Attach a progress observer, called once per exported frame.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Share a stop signal; extraction halts at the next frame boundary once
    /// it is raised.
    #[must_use]
    pub fn with_signal(mut self, signal: StopSignal) -> Self {
        self.signal = signal;
        self
    }

    /// Extract every frame of one video file.
    ///
    /// Output lands in `<output_root>/<file stem>/`. The decode session is
    /// released before this returns.
    ///
    /// # Errors
    ///
    /// Only open-time failures surface ([`FrameSiftError::FileOpen`],
    /// [`FrameSiftError::NoVideoStream`]); mid-stream failures end the
    /// file's extraction as a clean end of stream.
    pub fn extract_file(&self, video: &Path) -> Result<u64, FrameSiftError> {
        let base_name = video
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());

        let mut source = VideoSource::open_with(video, self.count_strategy)?;
        let out_dir = self.output_root.join(&base_name);
        let exporter = FrameExporter::new(out_dir, &base_name, self.spec.clone())?;

        let extracted = self.drain_source(&mut source, &exporter)?;
        source.close();

        log::info!("Extracted {extracted} frames from {}", video.display());
        Ok(extracted)
    }

    /// Extract every file in order, isolating failures per file.
    pub fn extract_all(&self, videos: &[PathBuf]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for video in videos {
            if self.signal.is_raised() {
                break;
            }
            match self.extract_file(video) {
                Ok(frames) => summary.completed.push((video.clone(), frames)),
                Err(error) => {
                    log::error!("Skipping {}: {error}", video.display());
                    summary.failed.push((video.clone(), error));
                }
            }
        }

        summary
    }

    /// The sequential read/export loop, generic over the source so the
    /// pipeline is testable without media fixtures.
    pub fn drain_source<S: FrameSource>(
        &self,
        source: &mut S,
        exporter: &FrameExporter,
    ) -> Result<u64, FrameSiftError> {
        let total = source.metadata().frame_count;
        let mut tracker =
            ProgressTracker::new(Arc::clone(&self.progress), OperationType::FrameExtraction, total);

        loop {
            if self.signal.is_raised() {
                break;
            }
            let frame = match source.read_next() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(error) => {
                    log::warn!("Decode failed mid-stream, stopping this file: {error}");
                    break;
                }
            };

            let report = exporter.export(&frame);
            if !report.is_complete() {
                log::warn!(
                    "Frame {}: {} of {} variants failed",
                    frame.index,
                    report.failures.len(),
                    exporter.spec().variant_count(),
                );
            }
            tracker.advance(Some(frame.index));
        }

        Ok(tracker.completed())
    }
}
