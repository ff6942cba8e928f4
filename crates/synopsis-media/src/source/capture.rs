//! OpenCV `VideoCapture` frame source.

use image::RgbImage;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{
    VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_FRAME_HEIGHT,
    CAP_PROP_FRAME_WIDTH, CAP_PROP_POS_FRAMES,
};
use std::path::{Path, PathBuf};
use tracing::info;

use super::FrameSource;
use crate::error::{MediaError, MediaResult};
use crate::frame::VideoProperties;

/// Sequential decoder backed by OpenCV.
pub struct OpenCvFrameSource {
    path: PathBuf,
    cap: VideoCapture,
    properties: VideoProperties,
}

impl OpenCvFrameSource {
    pub fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path));
        }
        let path_str = path.to_str().ok_or_else(|| {
            MediaError::invalid_video(format!("Non UTF-8 path: {}", path.display()))
        })?;

        let cap = VideoCapture::from_file(path_str, CAP_ANY)
            .map_err(|e| MediaError::invalid_video(format!("Failed to open video: {}", e)))?;
        if !cap.is_opened().unwrap_or(false) {
            return Err(MediaError::invalid_video(format!(
                "Failed to open video file: {}",
                path.display()
            )));
        }

        let properties = VideoProperties {
            fps: cap.get(CAP_PROP_FPS).unwrap_or(0.0),
            frame_count: cap.get(CAP_PROP_FRAME_COUNT).unwrap_or(0.0).max(0.0) as u64,
            width: cap.get(CAP_PROP_FRAME_WIDTH).unwrap_or(0.0) as u32,
            height: cap.get(CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0) as u32,
        };
        if properties.fps <= 0.0 || properties.width == 0 || properties.height == 0 {
            return Err(MediaError::invalid_video(format!(
                "{} reports no usable video stream",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            width = properties.width,
            height = properties.height,
            fps = properties.fps,
            frames = properties.frame_count,
            "Opened video with OpenCV"
        );

        Ok(Self {
            path,
            cap,
            properties,
        })
    }

    fn read_mat(&mut self) -> MediaResult<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.cap.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl FrameSource for OpenCvFrameSource {
    fn properties(&self) -> VideoProperties {
        self.properties
    }

    fn read_raw(&mut self) -> MediaResult<Option<RgbImage>> {
        let Some(frame) = self.read_mat()? else {
            return Ok(None);
        };

        let mut rgb = Mat::default();
        opencv::imgproc::cvt_color_def(&frame, &mut rgb, opencv::imgproc::COLOR_BGR2RGB)?;
        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb.data_bytes()?.to_vec();

        RgbImage::from_raw(width, height, data)
            .map(Some)
            .ok_or_else(|| MediaError::invalid_video("Decoded frame has unexpected size"))
    }

    fn skip_raw(&mut self) -> MediaResult<bool> {
        Ok(self.cap.grab()?)
    }

    fn rewind(&mut self) -> MediaResult<()> {
        if !self.cap.set(CAP_PROP_POS_FRAMES, 0.0)? {
            // Backend cannot seek.
            let path_str = self.path.to_str().unwrap_or_default();
            self.cap = VideoCapture::from_file(path_str, CAP_ANY)?;
        }
        Ok(())
    }
}
