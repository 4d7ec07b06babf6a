//! Progress reporting and session termination.
//!
//! [`ProgressCallback`] lets callers observe extraction progress without the
//! library committing to any particular terminal UI. [`StopSignal`] is the
//! single process-wide stop primitive: every loop iteration and command
//! dispatch in the crate checks it, and both the surface watcher and an
//! explicit quit command raise it.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of work currently reporting progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Extracting and writing video frames.
    FrameExtraction,
    /// Counting frames with a full decode scan.
    FrameCounting,
    /// Renaming files in the organizer.
    Organizing,
}

/// A snapshot of pipeline progress, delivered once per processed item.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items have been processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// The frame index currently being processed, when applicable.
    pub current_frame: Option<u64>,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`]; callbacks observe but
/// cannot halt the operation — use [`StopSignal`] to stop work.
pub trait ProgressCallback: Send + Sync {
    /// Called once per processed item.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Process-wide stop flag backed by an [`AtomicBool`].
///
/// Clone the signal and share it between the main loop and the surface
/// watcher; call [`raise`](StopSignal::raise) from any thread to request
/// termination. Raising is idempotent — the flag is set at most once in
/// effect, and once raised no further frame reads or writes happen.
///
/// # Example
///
/// ```
/// use framesift::StopSignal;
///
/// let signal = StopSignal::new();
/// assert!(!signal.is_raised());
///
/// // From the watcher thread, or a quit command:
/// signal.raise();
/// assert!(signal.is_raised());
/// ```
#[derive(Debug, Clone)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a new, unraised signal.
    pub fn new() -> Self {
        Self {
            raised: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request termination. All clones observe the raise.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Check whether termination has been requested.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal helper that tracks timing and emits one callback per item.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed item and fire the callback.
    pub(crate) fn advance(&mut self, frame_index: Option<u64>) {
        self.current += 1;
        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            elapsed: self.start_time.elapsed(),
            current_frame: frame_index,
        });
    }

    pub(crate) fn completed(&self) -> u64 {
        self.current
    }
}
