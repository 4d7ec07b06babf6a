//! Scripted test doubles for the frame source and the display surface.
//!
//! The playback controller and batch pipeline are generic over both seams,
//! so the whole state machine is exercisable without media fixtures or a
//! real terminal.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use framesift::{
    DecodedFrame, DisplaySurface, FrameCountStrategy, FrameSiftError, FrameSource, InputKey,
    VideoMetadata,
};
use image::{DynamicImage, Rgb, RgbImage};

/// A deterministic in-memory frame source.
///
/// Frame `i` is a solid-color 8×8 image encoding `i` in its red channel.
/// An optional failure index makes `read_next`/`seek` return a decode error
/// there, mimicking a corrupt stream.
pub struct SyntheticSource {
    metadata: VideoMetadata,
    next_index: u64,
    fail_at: Option<u64>,
}

impl SyntheticSource {
    pub fn new(frame_count: u64) -> Self {
        Self {
            metadata: VideoMetadata {
                width: 8,
                height: 8,
                frames_per_second: 25.0,
                frame_count: Some(frame_count),
                count_strategy: FrameCountStrategy::Reported,
            },
            next_index: 0,
            fail_at: None,
        }
    }

    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    fn frame(&self, index: u64) -> DecodedFrame {
        let image = RgbImage::from_pixel(8, 8, Rgb([(index % 256) as u8, 0, 0]));
        DecodedFrame {
            index,
            image: DynamicImage::ImageRgb8(image),
        }
    }
}

impl FrameSource for SyntheticSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn read_next(&mut self) -> Result<Option<DecodedFrame>, FrameSiftError> {
        if let Some(count) = self.metadata.frame_count {
            if self.next_index >= count {
                return Ok(None);
            }
        }
        if self.fail_at == Some(self.next_index) {
            return Err(FrameSiftError::DecodeError(format!(
                "synthetic decode failure at frame {}",
                self.next_index
            )));
        }
        let frame = self.frame(self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn seek(&mut self, index: u64) -> Result<DecodedFrame, FrameSiftError> {
        let target = match self.metadata.last_frame_index() {
            Some(last) => index.min(last),
            None => index,
        };
        if self.fail_at == Some(target) {
            return Err(FrameSiftError::DecodeError(format!(
                "synthetic decode failure at frame {target}"
            )));
        }
        self.next_index = target + 1;
        Ok(self.frame(target))
    }
}

/// A display surface driven by a pre-written key script.
///
/// Every `next_key` call pops the next entry (`None` models a timeout with
/// no input) and records whether the wait was bounded or blocking, which is
/// how tests observe the Playing/Paused distinction. An exhausted script
/// yields Escape so a runaway loop still terminates.
pub struct ScriptedSurface {
    keys: VecDeque<Option<InputKey>>,
    /// Frame indices rendered, in order.
    pub shown: Vec<u64>,
    /// Status lines observed, in order.
    pub statuses: Vec<String>,
    /// `true` per key wait when it carried a timeout (Playing cadence).
    pub timed_waits: Vec<bool>,
    open: bool,
    close_after_waits: Option<usize>,
    waits_seen: usize,
}

impl ScriptedSurface {
    pub fn new(keys: impl IntoIterator<Item = Option<InputKey>>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            shown: Vec::new(),
            statuses: Vec::new(),
            timed_waits: Vec::new(),
            open: true,
            close_after_waits: None,
            waits_seen: 0,
        }
    }

    /// Report the surface closed after the given number of key waits.
    pub fn closing_after_waits(mut self, waits: usize) -> Self {
        self.close_after_waits = Some(waits);
        self
    }
}

impl DisplaySurface for ScriptedSurface {
    fn show(&mut self, frame: &DecodedFrame) -> Result<(), FrameSiftError> {
        self.shown.push(frame.index);
        Ok(())
    }

    fn next_key(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<InputKey>, FrameSiftError> {
        self.timed_waits.push(timeout.is_some());
        self.waits_seen += 1;
        if let Some(limit) = self.close_after_waits {
            if self.waits_seen >= limit {
                self.open = false;
            }
        }
        Ok(self.keys.pop_front().unwrap_or(Some(InputKey::Escape)))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn show_status(&mut self, line: &str) {
        self.statuses.push(line.to_string());
    }
}
