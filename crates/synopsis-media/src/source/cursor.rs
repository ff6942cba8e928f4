//! Forward-only sampling cursor.

use image::RgbImage;
use synopsis_models::{RawFrameNumber, SampledIndex};
use tracing::debug;

use super::FrameSource;
use crate::error::{MediaError, MediaResult};
use crate::frame::{Frame, VideoProperties};

/// Sampling cursor over a [`FrameSource`].
///
/// Every sampled frame is the last of a group of `period` raw frames, so
/// sample `i` is raw frame `(i + 1) * period - 1`. Random access is served by
/// reading forward; a target behind the current position costs a rewind to
/// frame zero.
pub struct FrameCursor {
    source: Box<dyn FrameSource>,
    period: usize,
    properties: VideoProperties,
    /// Raw frames consumed since the last rewind.
    consumed: u64,
    rewinds: usize,
}

impl FrameCursor {
    /// Wrap a source with sampling period `period`.
    pub fn new<S: FrameSource + 'static>(source: S, period: usize) -> MediaResult<Self> {
        if period == 0 {
            return Err(MediaError::config("Sampling period must be at least 1"));
        }
        let properties = source.properties();
        Ok(Self {
            source: Box::new(source),
            period,
            properties,
            consumed: 0,
            rewinds: 0,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn properties(&self) -> VideoProperties {
        self.properties
    }

    /// Number of rewinds performed so far.
    pub fn rewinds(&self) -> usize {
        self.rewinds
    }

    /// Raw frames consumed since the last rewind.
    pub fn raw_position(&self) -> RawFrameNumber {
        RawFrameNumber(self.consumed)
    }

    /// Rewind to the first frame.
    pub fn reset(&mut self) -> MediaResult<()> {
        if self.consumed == 0 {
            return Ok(());
        }
        self.source.rewind()?;
        self.consumed = 0;
        self.rewinds += 1;
        debug!(rewinds = self.rewinds, "Frame cursor rewound");
        Ok(())
    }

    /// Next sampled frame, or `None` at end of stream.
    ///
    /// A trailing group shorter than the period counts as end of stream.
    pub fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
        let period = self.period as u64;
        let misalignment = self.consumed % period;
        if misalignment != 0 {
            for _ in misalignment..period {
                if !self.skip_one()? {
                    return Ok(None);
                }
            }
        }

        for _ in 1..period {
            if !self.skip_one()? {
                return Ok(None);
            }
        }
        let Some(image) = self.read_one()? else {
            return Ok(None);
        };

        let index = SampledIndex((self.consumed / period) as usize - 1);
        Ok(Some(Frame::new(index, image)))
    }

    /// Sampled frame at `index`.
    pub fn frame_at(&mut self, index: SampledIndex) -> MediaResult<Frame> {
        let image = self.raw_frame_at(index.to_raw(self.period))?;
        Ok(Frame::new(index, image))
    }

    /// Raw frame at `target`, rewinding only if it lies behind the cursor.
    pub fn raw_frame_at(&mut self, target: RawFrameNumber) -> MediaResult<RgbImage> {
        if target.0 < self.consumed {
            self.reset()?;
        }
        while self.consumed < target.0 {
            if !self.skip_one()? {
                return Err(MediaError::stream_inconsistency(target.0, self.consumed));
            }
        }
        self.read_one()?
            .ok_or_else(|| MediaError::stream_inconsistency(target.0, self.consumed))
    }

    fn read_one(&mut self) -> MediaResult<Option<RgbImage>> {
        let frame = self.source.read_raw()?;
        if frame.is_some() {
            self.consumed += 1;
        }
        Ok(frame)
    }

    fn skip_one(&mut self) -> MediaResult<bool> {
        let skipped = self.source.skip_raw()?;
        if skipped {
            self.consumed += 1;
        }
        Ok(skipped)
    }
}
