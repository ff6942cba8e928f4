//! Keyframe models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::frame_index::{RawFrameNumber, SampledIndex};

/// A representative frame chosen to summarize a span of video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Keyframe {
    /// Position in the sampled sequence that nominated this keyframe
    pub index: SampledIndex,
    /// Raw frame to extract (after the rewind offset)
    pub frame: RawFrameNumber,
    /// Presentation time of `frame` in seconds
    pub timestamp: f64,
}

impl Keyframe {
    /// Build a keyframe from a sampled index.
    ///
    /// `rewind_frames` is subtracted from the raw frame number (saturating).
    pub fn from_sampled(index: SampledIndex, period: usize, rewind_frames: u64, fps: f64) -> Self {
        let frame = index.to_raw(period).rewind(rewind_frames);
        Self {
            index,
            frame,
            timestamp: frame.seconds(fps),
        }
    }
}

/// A keyframe after its image has been handed to an image sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SavedKeyframe {
    /// Reference returned by the sink (path, URL, ...)
    pub reference: String,
    /// Presentation time in seconds
    pub timestamp: f64,
}

impl SavedKeyframe {
    pub fn new(reference: impl Into<String>, timestamp: f64) -> Self {
        Self {
            reference: reference.into(),
            timestamp,
        }
    }
}
