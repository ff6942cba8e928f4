//! Keyframe image sinks.

use std::path::{Path, PathBuf};

use synopsis_models::RawFrameNumber;
use tracing::debug;

use crate::error::MediaResult;

/// Destination for encoded keyframe images.
///
/// Returns a reference (path, URL, ...) that the merged content points at.
pub trait ImageSink: Send {
    fn save(&mut self, image_bytes: &[u8], position: RawFrameNumber) -> MediaResult<String>;
}

/// Writes `<dir>/<position>.png` on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalImageSink {
    dir: PathBuf,
}

impl LocalImageSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>) -> MediaResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, position: RawFrameNumber) -> PathBuf {
        self.dir.join(format!("{}.png", position))
    }
}

impl ImageSink for LocalImageSink {
    fn save(&mut self, image_bytes: &[u8], position: RawFrameNumber) -> MediaResult<String> {
        let path = self.path_for(position);
        std::fs::write(&path, image_bytes)?;
        debug!(path = %path.display(), bytes = image_bytes.len(), "Saved keyframe image");
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Keeps encoded images in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSink {
    pub images: Vec<(RawFrameNumber, Vec<u8>)>,
}

impl ImageSink for MemoryImageSink {
    fn save(&mut self, image_bytes: &[u8], position: RawFrameNumber) -> MediaResult<String> {
        self.images.push((position, image_bytes.to_vec()));
        Ok(format!("memory://{}", position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_sink_writes_numbered_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = LocalImageSink::new(dir.path().join("frames")).unwrap();
        let reference = sink.save(b"png-bytes", RawFrameNumber(42)).unwrap();

        let expected = dir.path().join("frames").join("42.png");
        assert_eq!(reference, expected.to_string_lossy());
        assert_eq!(std::fs::read(expected).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemoryImageSink::default();
        assert_eq!(sink.save(&[1, 2], RawFrameNumber(7)).unwrap(), "memory://7");
        assert_eq!(sink.images.len(), 1);
    }
}
