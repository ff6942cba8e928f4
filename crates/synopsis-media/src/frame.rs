//! Decoded frames and stream properties.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use synopsis_models::SampledIndex;

/// Static properties of a frame stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoProperties {
    /// Frames per second
    pub fps: f64,
    /// Total raw frames (0 if unknown)
    pub frame_count: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl VideoProperties {
    /// Number of sampled frames spanning `secs` at sampling `period`.
    ///
    /// `floor(secs * fps / period)`, the convention used for every
    /// seconds-based window in the strategies.
    pub fn sampled_frames_for(&self, secs: f64, period: usize) -> usize {
        if secs <= 0.0 || self.fps <= 0.0 {
            return 0;
        }
        ((secs * self.fps) / period.max(1) as f64).floor() as usize
    }

    /// Number of raw frames spanning `secs`.
    pub fn raw_frames_for(&self, secs: f64) -> u64 {
        if secs <= 0.0 || self.fps <= 0.0 {
            return 0;
        }
        (secs * self.fps).round() as u64
    }

    /// Duration in seconds derived from the frame count.
    pub fn duration_secs(&self) -> f64 {
        if self.fps <= 0.0 {
            return 0.0;
        }
        self.frame_count as f64 / self.fps
    }
}

/// A sampled frame: decoded pixels plus its position in the sampled sequence.
#[derive(Debug, Clone)]
pub struct Frame {
    index: SampledIndex,
    image: RgbImage,
}

impl Frame {
    pub fn new(index: SampledIndex, image: RgbImage) -> Self {
        Self { index, image }
    }

    pub fn index(&self) -> SampledIndex {
        self.index
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Full-resolution luma plane.
    pub fn luma(&self) -> GrayImage {
        imageops::grayscale(&self.image)
    }

    /// Luma plane resized to `width` x `height` with bilinear filtering.
    pub fn luma_resized(&self, width: u32, height: u32) -> GrayImage {
        let gray = self.luma();
        if gray.width() == width && gray.height() == height {
            return gray;
        }
        imageops::resize(&gray, width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_sampled_frames_for() {
        let props = VideoProperties {
            fps: 30.0,
            frame_count: 900,
            width: 1280,
            height: 720,
        };
        assert_eq!(props.sampled_frames_for(1.0, 3), 10);
        assert_eq!(props.sampled_frames_for(0.5, 3), 5);
        assert_eq!(props.sampled_frames_for(4.0, 3), 40);
        assert_eq!(props.sampled_frames_for(0.0, 3), 0);
        assert_eq!(props.raw_frames_for(1.0), 30);
        assert!((props.duration_secs() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_sampled_frames_for_fractional_fps() {
        let props = VideoProperties {
            fps: 29.97,
            frame_count: 0,
            width: 1,
            height: 1,
        };
        assert_eq!(props.sampled_frames_for(1.0, 3), 9);
    }

    #[test]
    fn test_luma_resized() {
        let image = RgbImage::from_pixel(8, 4, Rgb([200, 200, 200]));
        let frame = Frame::new(SampledIndex(3), image);
        let small = frame.luma_resized(4, 2);
        assert_eq!(small.dimensions(), (4, 2));
        assert!(small.pixels().all(|p| (p.0[0] as i32 - 200).abs() <= 1));
        assert_eq!(frame.index(), SampledIndex(3));
    }
}
