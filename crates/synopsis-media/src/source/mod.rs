//! Frame sources and the forward-only sampling cursor.
//!
//! ```text
//! ┌──────────────┐  read_raw()   ┌─────────────┐  next_frame() / frame_at()
//! │ FrameSource  │ ────────────▶ │ FrameCursor │ ─────────────────────────▶ strategies
//! │ ffmpeg/dir/  │ ◀──────────── │ (period P)  │
//! │ memory/cv    │   rewind()    └─────────────┘
//! └──────────────┘
//! ```
//!
//! A source only moves forward. Revisiting an earlier frame means rewinding
//! to the start and decoding forward again, so callers request frames in
//! ascending order.

mod cursor;
mod ffmpeg;
mod images;
mod memory;
#[cfg(feature = "opencv")]
mod capture;

pub use cursor::FrameCursor;
pub use ffmpeg::FfmpegFrameSource;
pub use images::ImageSequenceSource;
pub use memory::MemoryFrameSource;
#[cfg(feature = "opencv")]
pub use capture::OpenCvFrameSource;

use image::RgbImage;
use std::path::Path;

use crate::error::MediaResult;
use crate::frame::VideoProperties;

/// Sequential decoder of raw frames.
pub trait FrameSource: Send {
    /// Stream properties, known after construction.
    fn properties(&self) -> VideoProperties;

    /// Decode the next raw frame, or `None` at end of stream.
    fn read_raw(&mut self) -> MediaResult<Option<RgbImage>>;

    /// Advance past one raw frame without keeping it.
    ///
    /// Returns `false` at end of stream.
    fn skip_raw(&mut self) -> MediaResult<bool> {
        Ok(self.read_raw()?.is_some())
    }

    /// Restart decoding from the first frame.
    fn rewind(&mut self) -> MediaResult<()>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn properties(&self) -> VideoProperties {
        (**self).properties()
    }

    fn read_raw(&mut self) -> MediaResult<Option<RgbImage>> {
        (**self).read_raw()
    }

    fn skip_raw(&mut self) -> MediaResult<bool> {
        (**self).skip_raw()
    }

    fn rewind(&mut self) -> MediaResult<()> {
        (**self).rewind()
    }
}

/// Open a frame source for `path`.
///
/// Directories are read as image sequences at `image_fps`; anything else is
/// decoded as a video file.
pub fn open_source(path: impl AsRef<Path>, image_fps: f64) -> MediaResult<Box<dyn FrameSource>> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(path, image_fps)?));
    }

    #[cfg(feature = "opencv")]
    {
        if which::which("ffmpeg").is_err() {
            return Ok(Box::new(OpenCvFrameSource::open(path)?));
        }
    }

    Ok(Box::new(FfmpegFrameSource::open(path)?))
}
