//! Haar cascade presenter detector.

use std::path::{Path, PathBuf};

use opencv::core::{Mat, Rect, Size, Vector, CV_8UC1};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use tracing::{debug, info};

use super::region::HumanRegion;
use super::HumanDetector;
use crate::error::{MediaError, MediaResult};
use crate::frame::Frame;

const SCALE_FACTOR: f64 = 1.05;
const MIN_NEIGHBORS: i32 = 3;

/// Upper-body detector backed by an OpenCV cascade classifier.
///
/// All detections in a frame are merged into one bounding region.
pub struct HaarCascadeDetector {
    classifier: CascadeClassifier,
    path: PathBuf,
}

impl HaarCascadeDetector {
    /// Load a cascade from an XML file.
    pub fn new(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(MediaError::config(format!(
                "Cascade file not found: {}",
                path.display()
            )));
        }
        let path_str = path.to_str().ok_or_else(|| {
            MediaError::config(format!("Non UTF-8 cascade path: {}", path.display()))
        })?;

        let classifier = CascadeClassifier::new(path_str).map_err(|e| {
            MediaError::config(format!("Invalid detector configuration: {}", e))
        })?;
        if classifier.empty().unwrap_or(true) {
            return Err(MediaError::config(format!(
                "Invalid detector configuration: {} holds no cascade",
                path.display()
            )));
        }

        info!(path = %path.display(), "Loaded Haar cascade");
        Ok(Self { classifier, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn to_mat(frame: &Frame) -> MediaResult<Mat> {
        let luma = frame.luma();
        let mut mat = Mat::new_rows_cols_with_default(
            luma.height() as i32,
            luma.width() as i32,
            CV_8UC1,
            opencv::core::Scalar::all(0.0),
        )?;
        mat.data_bytes_mut()?.copy_from_slice(luma.as_raw());
        Ok(mat)
    }
}

impl HumanDetector for HaarCascadeDetector {
    fn detect(&mut self, frame: &Frame) -> MediaResult<HumanRegion> {
        let mat = Self::to_mat(frame)?;
        let min_side = (frame.height() / 5) as i32;

        let mut rects: Vector<Rect> = Vector::new();
        self.classifier.detect_multi_scale(
            &mat,
            &mut rects,
            SCALE_FACTOR,
            MIN_NEIGHBORS,
            0,
            Size::new(min_side, min_side),
            Size::default(),
        )?;

        let region = rects.iter().fold(HumanRegion::EMPTY, |acc, r| {
            acc.union(&HumanRegion::from_rect(
                r.x.max(0) as u32,
                r.y.max(0) as u32,
                r.width.max(0) as u32,
                r.height.max(0) as u32,
            ))
        });
        debug!(
            frame = %frame.index(),
            detections = rects.len(),
            empty = region.is_empty(),
            "Cascade detection"
        );
        Ok(region)
    }

    fn name(&self) -> &'static str {
        "haar_cascade"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_cascade_is_config_error() {
        let err = HaarCascadeDetector::new("/nonexistent/cascade.xml")
            .err()
            .unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_empty_cascade_is_config_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(HaarCascadeDetector::new(file.path()).is_err());
    }
}
