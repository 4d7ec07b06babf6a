//! Playback state machine tests, driven by scripted doubles.

mod common;

use common::{ScriptedSurface, SyntheticSource};
use framesift::{
    ExportFormat, ExportSpec, FrameExporter, InputKey, Player, PlayerOptions, SessionEnd,
    StopSignal,
};

fn png_exporter(dir: &std::path::Path) -> FrameExporter {
    FrameExporter::new(dir, "clip", ExportSpec::single(ExportFormat::Png))
        .expect("Failed to create exporter")
}

// ── The review scenario ────────────────────────────────────────────

#[test]
fn pause_step_save_step_quit_scenario() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    let source = SyntheticSource::new(10);
    let mut surface = ScriptedSurface::new([
        Some(InputKey::Char(' ')), // pause on frame 0
        Some(InputKey::Right),     // step to 1
        Some(InputKey::Right),     // step to 2
        Some(InputKey::Char('s')), // save frame 2
        Some(InputKey::Left),      // step back to 1
        Some(InputKey::Escape),    // quit
    ]);
    let signal = StopSignal::new();

    let summary = Player::new(source, &mut surface, signal.clone())
        .with_exporter(png_exporter(out))
        .run()
        .expect("Session failed");

    assert_eq!(summary.ended, SessionEnd::Quit);
    assert_eq!(summary.final_index, Some(1));
    assert_eq!(summary.frames_saved, 1);
    assert_eq!(surface.shown, vec![0, 1, 2, 1]);

    // Quit raises the process-wide signal.
    assert!(signal.is_raised());

    // Exactly one frame exported, at index 2.
    let written: Vec<String> = std::fs::read_dir(out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written, vec!["clip_frame_000002.png".to_string()]);
}

// ── State transitions ──────────────────────────────────────────────

#[test]
fn stepping_always_forces_pause() {
    // Step while Playing: the following wait must be blocking (Paused).
    let source = SyntheticSource::new(10);
    let mut surface = ScriptedSurface::new([
        Some(InputKey::Right),  // step while playing
        Some(InputKey::Escape),
    ]);

    Player::new(source, &mut surface, StopSignal::new())
        .run()
        .expect("Session failed");

    assert_eq!(surface.timed_waits, vec![true, false]);
    assert_eq!(surface.shown, vec![0, 1]);
}

#[test]
fn save_mutates_neither_state_nor_index() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    // Save while Playing: playback stays timed and the cursor advances
    // normally afterwards.
    let source = SyntheticSource::new(3);
    let mut surface = ScriptedSurface::new([
        Some(InputKey::Char('s')), // save frame 0 while playing
        Some(InputKey::Escape),
    ]);

    let summary = Player::new(source, &mut surface, StopSignal::new())
        .with_exporter(png_exporter(out))
        .run()
        .expect("Session failed");

    assert_eq!(surface.timed_waits, vec![true, true]);
    assert_eq!(surface.shown, vec![0, 1]);
    assert_eq!(summary.final_index, Some(1));
    assert!(out.join("clip_frame_000000.png").exists());
}

#[test]
fn toggle_resumes_playback() {
    let source = SyntheticSource::new(3);
    let mut surface = ScriptedSurface::new([
        Some(InputKey::Char(' ')), // pause on frame 0
        Some(InputKey::Char(' ')), // resume
        None,                      // frame 1 plays through
        None,                      // frame 2 plays through
    ]);

    let summary = Player::new(source, &mut surface, StopSignal::new())
        .run()
        .expect("Session failed");

    assert_eq!(summary.ended, SessionEnd::EndOfStream);
    assert_eq!(surface.shown, vec![0, 1, 2]);
    assert_eq!(surface.timed_waits, vec![true, false, true, true]);
}

// ── Index clamping ─────────────────────────────────────────────────

#[test]
fn step_backward_clamps_at_zero() {
    let source = SyntheticSource::new(5);
    let mut surface = ScriptedSurface::new([
        Some(InputKey::Char(' ')),
        Some(InputKey::Left), // already at 0: re-display 0
        Some(InputKey::Escape),
    ]);

    let summary = Player::new(source, &mut surface, StopSignal::new())
        .run()
        .expect("Session failed");

    assert_eq!(surface.shown, vec![0, 0]);
    assert_eq!(summary.final_index, Some(0));
}

#[test]
fn step_forward_clamps_at_last_frame() {
    let source = SyntheticSource::new(2);
    let mut surface = ScriptedSurface::new([
        Some(InputKey::Char(' ')),
        Some(InputKey::Right), // 0 -> 1
        Some(InputKey::Right), // past the end: re-display 1
        Some(InputKey::Escape),
    ]);

    let summary = Player::new(source, &mut surface, StopSignal::new())
        .run()
        .expect("Session failed");

    assert_eq!(surface.shown, vec![0, 1, 1]);
    assert_eq!(summary.final_index, Some(1));
}

// ── Session endings ────────────────────────────────────────────────

#[test]
fn end_of_stream_terminates_cleanly() {
    let source = SyntheticSource::new(3);
    let mut surface = ScriptedSurface::new([None, None, None]);

    let summary = Player::new(source, &mut surface, StopSignal::new())
        .run()
        .expect("End of stream must not be an error");

    assert_eq!(summary.ended, SessionEnd::EndOfStream);
    assert_eq!(summary.frames_shown, 3);
}

#[test]
fn mid_stream_decode_failure_ends_like_end_of_stream() {
    let source = SyntheticSource::new(10).failing_at(1);
    let mut surface = ScriptedSurface::new([None]);

    let summary = Player::new(source, &mut surface, StopSignal::new())
        .run()
        .expect("Decode failure must end the session, not raise");

    assert_eq!(summary.ended, SessionEnd::EndOfStream);
    assert_eq!(surface.shown, vec![0]);
}

#[test]
fn closed_surface_ends_the_session_and_raises_the_signal() {
    let source = SyntheticSource::new(100);
    let mut surface = ScriptedSurface::new([None, None, None]).closing_after_waits(2);
    let signal = StopSignal::new();

    let summary = Player::new(source, &mut surface, signal.clone())
        .run()
        .expect("Session failed");

    assert_eq!(summary.ended, SessionEnd::SurfaceClosed);
    assert!(signal.is_raised());
    // No further frames were read once the surface was gone.
    assert_eq!(surface.shown, vec![0, 1]);
}

#[test]
fn pre_raised_signal_stops_before_any_read() {
    let source = SyntheticSource::new(10);
    let mut surface = ScriptedSurface::new([]);
    let signal = StopSignal::new();
    signal.raise();

    let summary = Player::new(source, &mut surface, signal)
        .run()
        .expect("Session failed");

    assert_eq!(summary.frames_shown, 0);
    assert!(surface.shown.is_empty());
}

// ── Watch-only configuration ───────────────────────────────────────

#[test]
fn watch_only_mode_ignores_step_and_save_keys() {
    let source = SyntheticSource::new(3);
    let mut surface = ScriptedSurface::new([
        Some(InputKey::Right),     // no stepping in watch-only mode
        Some(InputKey::Char('s')), // no exporter, no save
        None,
    ]);

    let summary = Player::new(source, &mut surface, StopSignal::new())
        .with_options(PlayerOptions {
            step_enabled: false,
        })
        .run()
        .expect("Session failed");

    assert_eq!(summary.ended, SessionEnd::EndOfStream);
    assert_eq!(surface.shown, vec![0, 1, 2]);
    assert_eq!(summary.frames_saved, 0);
    // Never paused: every wait was timed.
    assert!(surface.timed_waits.iter().all(|timed| *timed));
}
