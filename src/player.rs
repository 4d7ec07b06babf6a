//! Interactive playback controller.
//!
//! [`Player`] is the state machine behind frame review: it consumes mapped
//! key commands, drives a [`FrameSource`] (sequential reads while playing,
//! clamped seeks while stepping) and an optional [`FrameExporter`] (on
//! explicit save), and owns the Playing/Paused transitions. There is no
//! graceful stopped state — a session ends by reaching end of stream, by an
//! explicit quit, or abruptly when the display surface closes.
//!
//! Stepping and saving are configuration, not separate code paths: the
//! watch-only `play` mode and the full review mode run the same machine
//! with different [`PlayerOptions`].

use crate::{
    display::{DisplaySurface, InputKey},
    error::FrameSiftError,
    export::FrameExporter,
    progress::StopSignal,
    source::{DecodedFrame, FrameSource},
};

/// Playback state. Exactly one value at any instant, owned by the player;
/// transitions happen only through command dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Frames advance automatically at the stream's nominal rate.
    Playing,
    /// The loop blocks awaiting the next command.
    Paused,
}

/// A command mapped from a raw key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Terminate immediately, from any state.
    Quit,
    /// `Playing ⇄ Paused`.
    TogglePause,
    /// Force pause and re-display the previous frame.
    StepBackward,
    /// Force pause and display the next frame.
    StepForward,
    /// Export the frame currently on screen.
    SaveFrame,
}

/// Player configuration.
#[derive(Debug, Clone, Copy)]
pub struct PlayerOptions {
    /// Whether single-frame stepping commands are accepted.
    pub step_enabled: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self { step_enabled: true }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The source ran out of frames (or failed mid-stream) while playing.
    EndOfStream,
    /// The user asked to quit.
    Quit,
    /// The display surface closed or the stop signal was raised externally.
    SurfaceClosed,
}

/// What happened during a session.
#[derive(Debug)]
pub struct PlaybackSummary {
    /// Why the loop ended.
    pub ended: SessionEnd,
    /// How many frames were rendered.
    pub frames_shown: u64,
    /// How many save commands wrote at least one file.
    pub frames_saved: u64,
    /// Index of the frame on screen when the loop ended.
    pub final_index: Option<u64>,
}

/// Map a surface key to a command.
///
/// Pure: the same key, `step_enabled`, and `save_enabled` always yield the
/// same command. Keys gated off by configuration map to `None` rather than
/// to an error.
pub fn command_for_key(
    key: InputKey,
    step_enabled: bool,
    save_enabled: bool,
) -> Option<PlayerCommand> {
    match key {
        InputKey::Escape | InputKey::Char('q') => Some(PlayerCommand::Quit),
        InputKey::Char(' ') => Some(PlayerCommand::TogglePause),
        InputKey::Left | InputKey::Char('a') if step_enabled => Some(PlayerCommand::StepBackward),
        InputKey::Right | InputKey::Char('d') if step_enabled => Some(PlayerCommand::StepForward),
        InputKey::Char('s') if save_enabled => Some(PlayerCommand::SaveFrame),
        _ => None,
    }
}

enum StepDirection {
    Back,
    Forward,
}

/// The interactive playback state machine.
pub struct Player<S: FrameSource, D: DisplaySurface> {
    source: S,
    surface: D,
    exporter: Option<FrameExporter>,
    signal: StopSignal,
    options: PlayerOptions,
    title: String,
    state: PlaybackState,
    /// The frame currently on screen. Saving always uses this value — never
    /// a re-decoded copy.
    current: Option<DecodedFrame>,
    frames_shown: u64,
    frames_saved: u64,
}

impl<S: FrameSource, D: DisplaySurface> Player<S, D> {
    /// Create a player over a source and surface. The initial state is
    /// Playing.
    pub fn new(source: S, surface: D, signal: StopSignal) -> Self {
        Self {
            source,
            surface,
            exporter: None,
            signal,
            options: PlayerOptions::default(),
            title: String::new(),
            state: PlaybackState::Playing,
            current: None,
            frames_shown: 0,
            frames_saved: 0,
        }
    }

    /// Attach an exporter, enabling the save command.
    #[must_use]
    pub fn with_exporter(mut self, exporter: FrameExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: PlayerOptions) -> Self {
        self.options = options;
        self
    }

    /// Name shown in the status line, typically the video file name.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Run the session to completion.
    ///
    /// The stop signal and surface liveness are checked at every iteration
    /// and again before every command dispatch; once either trips, no
    /// further frame reads or writes happen. The source is released when the
    /// player is dropped on return — abrupt exits via the surface watcher
    /// skip that deliberately.
    pub fn run(mut self) -> Result<PlaybackSummary, FrameSiftError> {
        let interval = self.source.metadata().frame_interval();
        let legend = self.legend();
        self.surface.show_status(&legend);

        loop {
            if self.signal.is_raised() {
                return Ok(self.finish(SessionEnd::SurfaceClosed));
            }
            if !self.surface.is_open() {
                self.signal.raise();
                return Ok(self.finish(SessionEnd::SurfaceClosed));
            }

            let waited = match self.state {
                PlaybackState::Playing => {
                    let frame = match self.source.read_next() {
                        Ok(Some(frame)) => frame,
                        Ok(None) => return Ok(self.finish(SessionEnd::EndOfStream)),
                        Err(error) => {
                            // Mid-stream failure is a natural end, not a crash.
                            log::warn!("Decode failed, ending playback: {error}");
                            return Ok(self.finish(SessionEnd::EndOfStream));
                        }
                    };
                    if let Err(error) = self.display(frame) {
                        log::warn!("Display failed, ending playback: {error}");
                        self.signal.raise();
                        return Ok(self.finish(SessionEnd::SurfaceClosed));
                    }
                    self.surface.next_key(Some(interval))
                }
                PlaybackState::Paused => self.surface.next_key(None),
            };

            let key = match waited {
                Ok(key) => key,
                Err(error) => {
                    log::warn!("Input wait failed, ending playback: {error}");
                    self.signal.raise();
                    return Ok(self.finish(SessionEnd::SurfaceClosed));
                }
            };

            // Liveness may have changed while blocked in the key wait.
            if self.signal.is_raised() {
                return Ok(self.finish(SessionEnd::SurfaceClosed));
            }
            if !self.surface.is_open() {
                self.signal.raise();
                return Ok(self.finish(SessionEnd::SurfaceClosed));
            }

            let Some(key) = key else { continue };
            let save_enabled = self.exporter.is_some();
            let Some(command) = command_for_key(key, self.options.step_enabled, save_enabled)
            else {
                continue;
            };

            if let Some(end) = self.dispatch(command) {
                return Ok(self.finish(end));
            }
        }
    }

    fn dispatch(&mut self, command: PlayerCommand) -> Option<SessionEnd> {
        match command {
            PlayerCommand::Quit => {
                self.signal.raise();
                Some(SessionEnd::Quit)
            }
            PlayerCommand::TogglePause => {
                self.state = match self.state {
                    PlaybackState::Playing => PlaybackState::Paused,
                    PlaybackState::Paused => PlaybackState::Playing,
                };
                None
            }
            PlayerCommand::StepBackward => {
                self.step(StepDirection::Back);
                None
            }
            PlayerCommand::StepForward => {
                self.step(StepDirection::Forward);
                None
            }
            PlayerCommand::SaveFrame => {
                self.save_current();
                None
            }
        }
    }

    /// Seek one frame in the given direction and display the result.
    ///
    /// Stepping always forces pause; the index clamps at zero and, through
    /// the source's seek contract, at the last frame — stepping past either
    /// end re-displays the boundary frame.
    fn step(&mut self, direction: StepDirection) {
        self.state = PlaybackState::Paused;

        let current = self.current.as_ref().map_or(0, |frame| frame.index);
        let target = match direction {
            StepDirection::Back => current.saturating_sub(1),
            StepDirection::Forward => current.saturating_add(1),
        };

        match self.source.seek(target) {
            Ok(frame) => {
                if let Err(error) = self.display(frame) {
                    log::warn!("Display failed while stepping: {error}");
                }
            }
            Err(error) => {
                // The frame on screen stays valid; the step just didn't move.
                log::warn!("Seek to frame {target} failed: {error}");
            }
        }
    }

    /// Export the frame currently on screen. Neither the playback state nor
    /// the frame index changes.
    fn save_current(&mut self) {
        let (Some(frame), Some(exporter)) = (&self.current, &self.exporter) else {
            return;
        };

        let report = exporter.export(frame);
        if !report.written.is_empty() {
            self.frames_saved += 1;
        }
        self.surface.show_status(&format!(
            "saved frame {} ({}/{} variants){}",
            frame.index,
            report.written.len(),
            exporter.spec().variant_count(),
            if report.is_complete() { "" } else { " - see log" },
        ));
    }

    fn display(&mut self, frame: DecodedFrame) -> Result<(), FrameSiftError> {
        self.surface.show(&frame)?;
        let total = self
            .source
            .metadata()
            .frame_count
            .map_or_else(|| "?".to_string(), |count| count.to_string());
        let status = if self.title.is_empty() {
            format!("frame {}/{total}", frame.index)
        } else {
            format!("{} - frame {}/{total}", self.title, frame.index)
        };
        self.surface.show_status(&status);
        self.frames_shown += 1;
        self.current = Some(frame);
        Ok(())
    }

    fn legend(&self) -> String {
        let mut legend = String::from("ESC/q: quit    SPACE: pause/play");
        if self.options.step_enabled {
            legend.push_str("    a/\u{2190}: previous    d/\u{2192}: next");
        }
        if self.exporter.is_some() {
            legend.push_str("    s: save frame");
        }
        legend
    }

    fn finish(&mut self, ended: SessionEnd) -> PlaybackSummary {
        PlaybackSummary {
            ended,
            frames_shown: self.frames_shown,
            frames_saved: self.frames_saved,
            final_index: self.current.as_ref().map(|frame| frame.index),
        }
    }
}
