//! In-memory frame source.

use image::RgbImage;

use super::FrameSource;
use crate::error::MediaResult;
use crate::frame::VideoProperties;

/// Frame source backed by decoded images held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFrameSource {
    frames: Vec<RgbImage>,
    fps: f64,
    position: usize,
}

impl MemoryFrameSource {
    pub fn new(frames: Vec<RgbImage>, fps: f64) -> Self {
        Self {
            frames,
            fps,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemoryFrameSource {
    fn properties(&self) -> VideoProperties {
        let (width, height) = self
            .frames
            .first()
            .map(|f| f.dimensions())
            .unwrap_or((0, 0));
        VideoProperties {
            fps: self.fps,
            frame_count: self.frames.len() as u64,
            width,
            height,
        }
    }

    fn read_raw(&mut self) -> MediaResult<Option<RgbImage>> {
        let frame = self.frames.get(self.position).cloned();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }

    fn skip_raw(&mut self) -> MediaResult<bool> {
        if self.position < self.frames.len() {
            self.position += 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn rewind(&mut self) -> MediaResult<()> {
        self.position = 0;
        Ok(())
    }
}
