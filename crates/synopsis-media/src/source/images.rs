//! Directory-of-images frame source.

use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::info;

use super::FrameSource;
use crate::error::{MediaError, MediaResult};
use crate::frame::VideoProperties;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Frame source over still images in a directory, ordered by file name.
#[derive(Debug)]
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    properties: VideoProperties,
    position: usize,
}

impl ImageSequenceSource {
    /// Open a directory of frames played back at `fps`.
    pub fn open(dir: impl AsRef<Path>, fps: f64) -> MediaResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(MediaError::FileNotFound(dir.to_path_buf()));
        }
        if fps.is_nan() || fps <= 0.0 {
            return Err(MediaError::config(format!(
                "Image sequence fps must be positive, got {}",
                fps
            )));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        let first = files.first().ok_or_else(|| {
            MediaError::invalid_video(format!("No images found in {}", dir.display()))
        })?;
        let (width, height) = image::image_dimensions(first)?;

        info!(
            dir = %dir.display(),
            frames = files.len(),
            width,
            height,
            "Opened image sequence"
        );

        Ok(Self {
            properties: VideoProperties {
                fps,
                frame_count: files.len() as u64,
                width,
                height,
            },
            files,
            position: 0,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn properties(&self) -> VideoProperties {
        self.properties
    }

    fn read_raw(&mut self) -> MediaResult<Option<RgbImage>> {
        let Some(path) = self.files.get(self.position) else {
            return Ok(None);
        };
        let image = image::open(path)?.to_rgb8();
        if image.dimensions() != (self.properties.width, self.properties.height) {
            return Err(MediaError::invalid_video(format!(
                "{} is {}x{}, expected {}x{}",
                path.display(),
                image.width(),
                image.height(),
                self.properties.width,
                self.properties.height
            )));
        }
        self.position += 1;
        Ok(Some(image))
    }

    fn skip_raw(&mut self) -> MediaResult<bool> {
        if self.position < self.files.len() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_image_sequence_order_and_properties() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("b.png", 20u8), ("a.png", 10), ("c.png", 30)] {
            RgbImage::from_pixel(4, 3, Rgb([value, value, value]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 10.0).unwrap();
        let props = source.properties();
        assert_eq!((props.width, props.height), (4, 3));
        assert_eq!(props.frame_count, 3);

        let first = source.read_raw().unwrap().unwrap();
        assert_eq!(first.get_pixel(0, 0).0[0], 10);
        assert!(source.skip_raw().unwrap());
        let third = source.read_raw().unwrap().unwrap();
        assert_eq!(third.get_pixel(0, 0).0[0], 30);
        assert!(source.read_raw().unwrap().is_none());

        source.rewind().unwrap();
        assert!(source.read_raw().unwrap().is_some());
    }

    #[test]
    fn test_image_sequence_rejects_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(dir.path(), 30.0),
            Err(MediaError::InvalidVideo(_))
        ));
        assert!(ImageSequenceSource::open(dir.path(), 0.0).is_err());
    }
}
