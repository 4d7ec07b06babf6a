//! FFmpeg log verbosity control.
//!
//! FFmpeg prints its own diagnostics to stderr, separate from the Rust
//! [`log`](https://crates.io/crates/log) facade. During an interactive
//! session that output would land inside the alternate screen and corrupt
//! the rendered frame, so the player clamps it to errors. This module wraps
//! FFmpeg's log-level API so callers never import `ffmpeg_next` directly.

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity.
///
/// Maps onto FFmpeg's `AV_LOG_*` constants; setting a level suppresses all
/// messages below that severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderLogLevel {
    /// Print no output at all.
    Quiet,
    /// Unrecoverable errors only.
    Error,
    /// Warnings and errors (FFmpeg's default).
    Warning,
    /// Informational messages and above.
    Info,
    /// Everything, including per-packet debug output.
    Debug,
}

impl DecoderLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            DecoderLogLevel::Quiet => Level::Quiet,
            DecoderLogLevel::Error => Level::Error,
            DecoderLogLevel::Warning => Level::Warning,
            DecoderLogLevel::Info => Level::Info,
            DecoderLogLevel::Debug => Level::Debug,
        }
    }
}

/// Set the verbosity of FFmpeg's own stderr output.
///
/// Interactive sessions call this with [`DecoderLogLevel::Error`] before
/// entering the alternate screen; batch extraction leaves the default alone
/// unless the caller overrides it.
pub fn set_decoder_log_level(level: DecoderLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
