//! Frame position types.
//!
//! Two coordinate systems coexist in the engine: positions in the *sampled*
//! sequence (every Nth decoded frame) and raw decoded frame numbers. They are
//! kept as distinct types; converting between them always needs the sampling
//! period.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a frame in the sampled sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SampledIndex(pub usize);

impl SampledIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Raw frame number returned by the cursor for this sample.
    ///
    /// The cursor reads `period` raw frames per sample and keeps the last one,
    /// so sample `i` is raw frame `(i + 1) * period - 1`.
    pub fn to_raw(self, period: usize) -> RawFrameNumber {
        let period = period.max(1) as u64;
        RawFrameNumber((self.0 as u64 + 1) * period - 1)
    }

    /// Move back by `frames` samples, floored at zero.
    pub fn back_off(self, frames: usize) -> Self {
        Self(self.0.saturating_sub(frames))
    }
}

impl fmt::Display for SampledIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for SampledIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Decoded frame number in the source video.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct RawFrameNumber(pub u64);

impl RawFrameNumber {
    pub fn new(frame: u64) -> Self {
        Self(frame)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Move back by `frames` raw frames, floored at zero.
    pub fn rewind(self, frames: u64) -> Self {
        Self(self.0.saturating_sub(frames))
    }

    /// Presentation time of this frame in seconds.
    pub fn seconds(self, fps: f64) -> f64 {
        if fps <= 0.0 {
            return 0.0;
        }
        self.0 as f64 / fps
    }

    /// Sample containing this raw frame.
    pub fn to_sampled(self, period: usize) -> SampledIndex {
        SampledIndex((self.0 / period.max(1) as u64) as usize)
    }
}

impl fmt::Display for RawFrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RawFrameNumber {
    fn from(frame: u64) -> Self {
        Self(frame)
    }
}
