//! Video source tests.
//!
//! Open-failure cases run everywhere; the decode tests need a fixture at
//! `tests/fixtures/sample_video.mp4` (any short clip) and skip when it is
//! absent.

use std::path::Path;

use framesift::{FrameCountStrategy, FrameSiftError, FrameSource, VideoSource};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

// ── Open failures ──────────────────────────────────────────────────

#[test]
fn opening_a_missing_file_fails_with_the_path() {
    match VideoSource::open("definitely_missing.mp4") {
        Err(FrameSiftError::FileOpen { path, .. }) => {
            assert_eq!(path, Path::new("definitely_missing.mp4"));
        }
        Err(other) => panic!("Expected FileOpen, got: {other:?}"),
        Ok(_) => panic!("Expected an error for a missing file"),
    }
}

#[test]
fn opening_a_non_media_file_fails() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = VideoSource::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

// ── Fixture-backed decode behaviour ────────────────────────────────

#[test]
fn sequential_reads_count_up_from_zero() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = VideoSource::open(path).expect("Failed to open fixture");
    for expected in 0..3 {
        let frame = source
            .read_next()
            .expect("Read failed")
            .expect("Fixture has fewer than 3 frames");
        assert_eq!(frame.index, expected);
        assert_eq!(frame.image.width(), source.metadata().width);
    }
}

#[test]
fn seek_clamps_past_the_end_to_the_last_frame() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = VideoSource::open_with(path, FrameCountStrategy::ScanAndCount)
        .expect("Failed to open fixture");
    let last = source
        .metadata()
        .last_frame_index()
        .expect("Scan must produce a count");

    let frame = source.seek(u64::MAX).expect("Clamped seek failed");
    assert_eq!(frame.index, last);
}

#[test]
fn read_after_seek_continues_from_the_next_index() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = VideoSource::open_with(path, FrameCountStrategy::ScanAndCount)
        .expect("Failed to open fixture");
    let count = source.metadata().frame_count.expect("Scan must count");
    if count < 4 {
        return;
    }

    source.seek(2).expect("Seek failed");
    let next = source
        .read_next()
        .expect("Read failed")
        .expect("Stream ended early");
    assert_eq!(next.index, 3);
}

#[test]
fn scan_and_count_agrees_with_sequential_exhaustion() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = VideoSource::open_with(path, FrameCountStrategy::ScanAndCount)
        .expect("Failed to open fixture");
    let counted = source.metadata().frame_count.expect("Scan must count");

    let mut read = 0_u64;
    while source.read_next().expect("Read failed").is_some() {
        read += 1;
    }
    assert_eq!(read, counted);
}
