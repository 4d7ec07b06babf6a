//! Video stream metadata.
//!
//! [`VideoMetadata`] is extracted once when a [`crate::VideoSource`] is opened
//! and cached for the lifetime of the source. The frame count may be exact,
//! estimated, or unknown depending on the [`FrameCountStrategy`] selected at
//! open time.

/// How the total frame count of a source is determined.
///
/// Chosen once at open time — the two strategies are an explicit interface,
/// not a fallback branch inside the open path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameCountStrategy {
    /// Derive an estimate from the container duration and the stream's
    /// average frame rate. Cheap, but approximate for variable-frame-rate
    /// content and unavailable when the container reports no duration.
    #[default]
    Reported,
    /// Decode every frame once on a throwaway session and count the reads.
    /// Exact, O(n) one-time cost, rewinds by reopening.
    ScanAndCount,
}

/// Metadata for the video stream of an opened source.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames, if known. `None` when the container reports
    /// neither a duration nor a frame rate and no counting scan was run.
    pub frame_count: Option<u64>,
    /// The strategy that produced [`frame_count`](Self::frame_count).
    pub count_strategy: FrameCountStrategy,
}

impl VideoMetadata {
    /// The largest valid frame index, if the frame count is known.
    pub fn last_frame_index(&self) -> Option<u64> {
        self.frame_count.and_then(|count| count.checked_sub(1))
    }

    /// Nominal wall-clock interval between frames at the stream's rate.
    ///
    /// Falls back to 40 ms (25 fps) when the rate is unknown or nonsensical.
    pub fn frame_interval(&self) -> std::time::Duration {
        if self.frames_per_second > 0.0 {
            std::time::Duration::from_secs_f64(1.0 / self.frames_per_second)
        } else {
            std::time::Duration::from_millis(40)
        }
    }
}
