//! Detector replaying regions computed ahead of time.

use std::path::Path;

use tracing::info;

use super::region::HumanRegion;
use super::HumanDetector;
use crate::error::{MediaError, MediaResult};
use crate::frame::Frame;

/// Regions per sampled index, typically exported from an external detector.
///
/// The JSON form is an array with one entry per sampled frame, each either a
/// region object or `null`. Indices past the end are empty.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedHumans {
    regions: Vec<Option<HumanRegion>>,
}

impl PrecomputedHumans {
    pub fn new(regions: Vec<Option<HumanRegion>>) -> Self {
        Self { regions }
    }

    /// Parse the JSON array form.
    pub fn from_json(content: &str) -> MediaResult<Self> {
        let regions: Vec<Option<HumanRegion>> = serde_json::from_str(content)?;
        Ok(Self::new(regions))
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let humans = Self::from_json(&content).map_err(|e| {
            MediaError::config(format!(
                "Invalid human regions file {}: {}",
                path.display(),
                e
            ))
        })?;
        info!(
            path = %path.display(),
            frames = humans.len(),
            "Loaded precomputed human regions"
        );
        Ok(humans)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region at a sampled index.
    pub fn region_at(&self, index: usize) -> HumanRegion {
        self.regions
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(HumanRegion::EMPTY)
    }
}

impl HumanDetector for PrecomputedHumans {
    fn detect(&mut self, frame: &Frame) -> MediaResult<HumanRegion> {
        Ok(self.region_at(frame.index().get()))
    }

    fn name(&self) -> &'static str {
        "precomputed"
    }
}
