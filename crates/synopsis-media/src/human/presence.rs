//! Presenter position classification.

use serde::{Deserialize, Serialize};

use super::region::HumanRegion;
use crate::error::{MediaError, MediaResult};

/// Where a presenter sits in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// No human found
    Empty,
    /// Human off to one side; content remains visible
    Side,
    /// Human centred or filling the frame (talking head)
    Center,
}

/// Thresholds deciding when a presenter counts as centred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanPresenceConfig {
    /// Left edge of the central band, as a fraction of frame width
    pub center_band_left: f64,
    /// Right edge of the central band, as a fraction of frame width
    pub center_band_right: f64,
    /// Region area (fraction of frame area) above which a human dominates the frame
    pub dominant_area_fraction: f64,
    /// Median kernel for presence smoothing (odd); `None` disables smoothing
    pub smoothing_kernel: Option<usize>,
}

impl Default for HumanPresenceConfig {
    fn default() -> Self {
        Self {
            center_band_left: 0.4,
            center_band_right: 0.6,
            dominant_area_fraction: 2.0 / 3.0,
            smoothing_kernel: None,
        }
    }
}

impl HumanPresenceConfig {
    /// Enable presence smoothing with the given median kernel.
    pub fn with_smoothing(mut self, kernel: usize) -> Self {
        self.smoothing_kernel = Some(kernel);
        self
    }

    /// Set the central band.
    pub fn with_center_band(mut self, left: f64, right: f64) -> Self {
        self.center_band_left = left;
        self.center_band_right = right;
        self
    }

    pub fn validate(&self) -> MediaResult<()> {
        if !(0.0..=1.0).contains(&self.center_band_left)
            || !(0.0..=1.0).contains(&self.center_band_right)
            || self.center_band_left > self.center_band_right
        {
            return Err(MediaError::config(format!(
                "Center band must satisfy 0 <= left <= right <= 1, got [{}, {}]",
                self.center_band_left, self.center_band_right
            )));
        }
        if !(self.dominant_area_fraction > 0.0 && self.dominant_area_fraction <= 1.0) {
            return Err(MediaError::config(format!(
                "dominant_area_fraction must be in (0, 1], got {}",
                self.dominant_area_fraction
            )));
        }
        if let Some(kernel) = self.smoothing_kernel {
            if kernel == 0 || kernel % 2 == 0 {
                return Err(MediaError::config(format!(
                    "smoothing_kernel must be odd, got {}",
                    kernel
                )));
            }
        }
        Ok(())
    }

    /// True if the region's centre lies in the central band of a frame `width` wide.
    pub fn is_centered(&self, region: &HumanRegion, width: u32) -> bool {
        if region.is_empty() {
            return false;
        }
        let center = region.center_x();
        let left = self.center_band_left * width as f64;
        let right = self.center_band_right * width as f64;
        left <= center && center <= right
    }

    /// True if the region covers more than the dominant fraction of the frame.
    pub fn dominates(&self, region: &HumanRegion, width: u32, height: u32) -> bool {
        let frame_area = width as f64 * height as f64;
        region.area() as f64 > self.dominant_area_fraction * frame_area
    }

    /// Classify one frame's region.
    pub fn classify(&self, region: &HumanRegion, width: u32, height: u32) -> Presence {
        if region.is_empty() {
            Presence::Empty
        } else if self.dominates(region, width, height) || self.is_centered(region, width) {
            Presence::Center
        } else {
            Presence::Side
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let config = HumanPresenceConfig::default();
        assert_eq!(config.classify(&HumanRegion::EMPTY, 100, 100), Presence::Empty);
        // Centre at 50.
        assert_eq!(
            config.classify(&HumanRegion::new(40, 60, 0, 50), 100, 100),
            Presence::Center
        );
        // Centre at 15.
        assert_eq!(
            config.classify(&HumanRegion::new(0, 30, 0, 50), 100, 100),
            Presence::Side
        );
        // Off-centre but covering 80% of the frame.
        assert_eq!(
            config.classify(&HumanRegion::new(0, 80, 0, 100), 100, 100),
            Presence::Center
        );
    }

    #[test]
    fn test_center_band_inclusive() {
        let config = HumanPresenceConfig::default();
        // Centre exactly at 40.
        assert!(config.is_centered(&HumanRegion::new(30, 50, 0, 10), 100));
        // Centre at 39.5.
        assert!(!config.is_centered(&HumanRegion::new(30, 49, 0, 10), 100));
    }

    #[test]
    fn test_validate() {
        assert!(HumanPresenceConfig::default().validate().is_ok());
        assert!(HumanPresenceConfig::default().with_smoothing(15).validate().is_ok());
        assert!(HumanPresenceConfig::default().with_smoothing(4).validate().is_err());
        assert!(HumanPresenceConfig::default()
            .with_center_band(0.7, 0.3)
            .validate()
            .is_err());
    }
}
