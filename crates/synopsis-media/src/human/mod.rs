//! Presenter detection.
//!
//! A [`HumanDetector`] returns the bounding region of a human figure in a
//! frame, or [`HumanRegion::EMPTY`] when none is visible. Absence is a normal
//! outcome, not an error.

mod presence;
mod precomputed;
mod region;
mod smoothing;
#[cfg(feature = "opencv")]
mod cascade;

pub use presence::{HumanPresenceConfig, Presence};
pub use precomputed::PrecomputedHumans;
pub use region::HumanRegion;
pub use smoothing::smooth_presence;
#[cfg(feature = "opencv")]
pub use cascade::HaarCascadeDetector;

use tracing::info;

use crate::error::MediaResult;
use crate::frame::Frame;
use crate::source::FrameCursor;

/// Human detection provider.
///
/// Owned by the pipeline and passed by reference into every strategy that
/// needs it. Detectors may keep internal buffers, hence `&mut self`.
pub trait HumanDetector: Send {
    /// Detect the presenter in a frame, in the frame's pixel coordinates.
    fn detect(&mut self, frame: &Frame) -> MediaResult<HumanRegion>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

impl<D: HumanDetector + ?Sized> HumanDetector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> MediaResult<HumanRegion> {
        (**self).detect(frame)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Detector for videos without a presenter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHumanDetector;

impl HumanDetector for NoHumanDetector {
    fn detect(&mut self, _frame: &Frame) -> MediaResult<HumanRegion> {
        Ok(HumanRegion::EMPTY)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Run the detector over every sampled frame, from the start of the stream.
///
/// Applies presence smoothing when `smoothing_kernel` is set. Leaves the
/// cursor at end of stream.
pub fn detect_all(
    cursor: &mut FrameCursor,
    detector: &mut dyn HumanDetector,
    smoothing_kernel: Option<usize>,
) -> MediaResult<Vec<HumanRegion>> {
    cursor.reset()?;
    let mut regions = Vec::new();
    while let Some(frame) = cursor.next_frame()? {
        regions.push(detector.detect(&frame)?);
    }

    let detected = regions.iter().filter(|r| !r.is_empty()).count();
    info!(
        detector = detector.name(),
        frames = regions.len(),
        detected,
        "Human detection complete"
    );

    Ok(match smoothing_kernel {
        Some(kernel) => smooth_presence(&regions, kernel),
        None => regions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFrameSource;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_detect_all_with_precomputed() {
        let frames = (0..12)
            .map(|_| RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])))
            .collect();
        let mut cursor = FrameCursor::new(MemoryFrameSource::new(frames, 30.0), 3).unwrap();
        let region = HumanRegion::new(0, 2, 0, 4);
        let mut detector =
            PrecomputedHumans::new(vec![Some(region), None, Some(region), Some(region)]);

        let regions = detect_all(&mut cursor, &mut detector, None).unwrap();
        assert_eq!(regions, vec![region, HumanRegion::EMPTY, region, region]);

        let smoothed = detect_all(&mut cursor, &mut detector, Some(3)).unwrap();
        assert_eq!(smoothed[1], region);
    }

    #[test]
    fn test_no_human_detector() {
        let frame = Frame::new(0.into(), RgbImage::new(2, 2));
        assert!(NoHumanDetector.detect(&frame).unwrap().is_empty());
    }
}
