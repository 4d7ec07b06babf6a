//! # framesift
//!
//! Sift media files — review videos frame by frame in the terminal and
//! extract still frames in multiple formats and qualities.
//!
//! `framesift` decodes video through FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and persists
//! frames as [`image`](https://crates.io/crates/image) files. Review happens
//! right in the terminal: frames render as truecolor half-block cells, and a
//! small set of keys drives playback, single-frame stepping, and saving.
//!
//! ## Quick Start
//!
//! ### Extract every frame
//!
//! ```no_run
//! use framesift::{BatchExtractor, ExportFormat, ExportSpec};
//!
//! let spec = ExportSpec::single(ExportFormat::Png);
//! let extractor = BatchExtractor::new("frames", spec);
//! let frames = extractor.extract_file("input.mp4".as_ref()).unwrap();
//! println!("extracted {frames} frames");
//! ```
//!
//! ### Review interactively and sift frames out by hand
//!
//! ```no_run
//! use framesift::{
//!     ExportSpec, FrameExporter, Player, StopSignal, TerminalSurface,
//!     VideoSource, spawn_surface_watcher,
//! };
//!
//! let source = VideoSource::open("input.mp4")?;
//! let surface = TerminalSurface::new()?;
//! let signal = StopSignal::new();
//! spawn_surface_watcher(surface.probe(), signal.clone());
//!
//! let spec = ExportSpec::from_options(&["png".into(), "jpg".into()], &[95])?;
//! let exporter = FrameExporter::new("frames/input", "input", spec)?;
//!
//! let summary = Player::new(source, surface, signal)
//!     .with_exporter(exporter)
//!     .with_title("input.mp4")
//!     .run()?;
//! println!("saved {} frame(s)", summary.frames_saved);
//! # Ok::<(), framesift::FrameSiftError>(())
//! ```
//!
//! ## Features
//!
//! - **Interactive review** — play/pause, frame-accurate forward and
//!   backward stepping, save-what-you-see, abrupt teardown when the
//!   terminal goes away
//! - **Batch extraction** — every frame of a file or a whole directory,
//!   with per-file failure isolation
//! - **Multi-variant export** — one decoded frame fans out to every
//!   configured format and quality level under deterministic names
//! - **Library organizing** — sidecar cleanup and modification-time
//!   renaming so folders sort chronologically
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system, and
//! interactive review needs a truecolor-capable terminal.

pub mod batch;
pub mod display;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod metadata;
pub mod monitor;
pub mod naming;
pub mod organize;
pub mod player;
pub mod progress;
pub mod source;
pub mod terminal;
mod utilities;

pub use batch::{BatchExtractor, BatchSummary};
pub use display::{DisplaySurface, InputKey};
pub use error::FrameSiftError;
pub use export::{ExportFailure, ExportFormat, ExportReport, ExportSpec, FrameExporter};
pub use ffmpeg::{DecoderLogLevel, set_decoder_log_level};
pub use metadata::{FrameCountStrategy, VideoMetadata};
pub use monitor::{SurfaceProbe, spawn_surface_watcher};
pub use naming::variant_file_name;
pub use organize::{OrganizeOptions, OrganizeSummary, find_files_with_extensions, organize_library};
pub use player::{
    PlaybackState, PlaybackSummary, Player, PlayerCommand, PlayerOptions, SessionEnd,
    command_for_key,
};
pub use progress::{OperationType, ProgressCallback, ProgressInfo, StopSignal};
pub use source::{DecodedFrame, FrameSource, VideoSource};
pub use terminal::{TerminalProbe, TerminalSurface};
