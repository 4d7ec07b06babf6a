//! Display surface abstraction.
//!
//! The interactive player depends on exactly three backend operations:
//! rendering a decoded frame, blocking-with-timeout key retrieval, and a
//! surface liveness query. [`DisplaySurface`] captures that contract; any
//! implementation is substitutable — the production terminal renderer lives
//! in [`crate::terminal`], and tests drive the player with a scripted
//! surface.

use std::time::Duration;

use crate::{error::FrameSiftError, source::DecodedFrame};

/// A keyboard input reported by a display surface, already lifted out of the
/// backend's raw key-code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// A printable character.
    Char(char),
    /// The escape key.
    Escape,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Enter / return.
    Enter,
}

/// The three-operation display/input backend contract.
pub trait DisplaySurface {
    /// Render a decoded frame to the surface.
    fn show(&mut self, frame: &DecodedFrame) -> Result<(), FrameSiftError>;

    /// Wait for the next key.
    ///
    /// With `Some(timeout)` the call returns `Ok(None)` if no key arrives in
    /// time; with `None` it blocks until a key arrives. Keys outside the
    /// backend's mapped set also come back as `Ok(None)`.
    fn next_key(&mut self, timeout: Option<Duration>)
    -> Result<Option<InputKey>, FrameSiftError>;

    /// Whether the surface still exists and is visible.
    fn is_open(&self) -> bool;

    /// Update the one-line status area. Cosmetic; default is a no-op.
    fn show_status(&mut self, _line: &str) {}
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for &mut D {
    fn show(&mut self, frame: &DecodedFrame) -> Result<(), FrameSiftError> {
        (**self).show(frame)
    }

    fn next_key(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<InputKey>, FrameSiftError> {
        (**self).next_key(timeout)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn show_status(&mut self, line: &str) {
        (**self).show_status(line);
    }
}
