//! Batch pipeline tests: whole-stream extraction and failure isolation.

mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use common::SyntheticSource;
use framesift::{
    BatchExtractor, ExportFormat, ExportSpec, FrameExporter, ProgressCallback, ProgressInfo,
    StopSignal,
};

struct RecordingProgress {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

#[test]
fn drains_a_source_to_exhaustion() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    let extractor = BatchExtractor::new(out, ExportSpec::single(ExportFormat::Png));
    let exporter = FrameExporter::new(out.join("clip"), "clip", ExportSpec::single(ExportFormat::Png))
        .expect("Failed to create exporter");

    let mut source = SyntheticSource::new(5);
    let frames = extractor
        .drain_source(&mut source, &exporter)
        .expect("Drain failed");

    assert_eq!(frames, 5);
    for index in 0..5 {
        assert!(
            out.join("clip")
                .join(format!("clip_frame_{index:06}.png"))
                .exists(),
        );
    }
}

#[test]
fn decode_failure_mid_stream_halts_as_clean_end_of_stream() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    let extractor = BatchExtractor::new(out, ExportSpec::single(ExportFormat::Png));
    let exporter = FrameExporter::new(out.join("clip"), "clip", ExportSpec::single(ExportFormat::Png))
        .expect("Failed to create exporter");

    // The source claims 1000 frames but frame 500 is undecodable.
    let mut source = SyntheticSource::new(1000).failing_at(500);
    let frames = extractor
        .drain_source(&mut source, &exporter)
        .expect("A mid-stream failure must not surface as an error");

    assert_eq!(frames, 500);
    assert!(out.join("clip").join("clip_frame_000499.png").exists());
    assert!(!out.join("clip").join("clip_frame_000500.png").exists());
}

#[test]
fn progress_fires_once_per_frame_with_the_known_total() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    let recorder = Arc::new(RecordingProgress {
        infos: Mutex::new(Vec::new()),
    });
    let extractor = BatchExtractor::new(out, ExportSpec::single(ExportFormat::Png))
        .with_progress(recorder.clone());
    let exporter = FrameExporter::new(out.join("clip"), "clip", ExportSpec::single(ExportFormat::Png))
        .expect("Failed to create exporter");

    let mut source = SyntheticSource::new(4);
    extractor
        .drain_source(&mut source, &exporter)
        .expect("Drain failed");

    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), 4);
    assert_eq!(infos.last().unwrap().current, 4);
    assert!(infos.iter().all(|info| info.total == Some(4)));
    assert_eq!(infos[2].current_frame, Some(2));
}

#[test]
fn raised_signal_stops_extraction_at_the_frame_boundary() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    let signal = StopSignal::new();
    signal.raise();

    let extractor = BatchExtractor::new(out, ExportSpec::single(ExportFormat::Png))
        .with_signal(signal);
    let exporter = FrameExporter::new(out.join("clip"), "clip", ExportSpec::single(ExportFormat::Png))
        .expect("Failed to create exporter");

    let mut source = SyntheticSource::new(100);
    let frames = extractor
        .drain_source(&mut source, &exporter)
        .expect("Drain failed");

    assert_eq!(frames, 0);
}

#[test]
fn a_failing_file_does_not_abort_the_batch() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    let extractor = BatchExtractor::new(out, ExportSpec::single(ExportFormat::Png));
    let missing = vec![
        PathBuf::from("does_not_exist_a.mp4"),
        PathBuf::from("does_not_exist_b.mp4"),
    ];

    let summary = extractor.extract_all(&missing);
    assert!(summary.completed.is_empty());
    assert_eq!(summary.failed.len(), 2);
    assert_eq!(summary.total_frames(), 0);
}
