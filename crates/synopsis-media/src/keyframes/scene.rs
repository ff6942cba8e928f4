//! Scene-cut keyframe strategy using color histogram comparison.
//!
//! # Algorithm
//!
//! 1. Compute a normalised HSV histogram for every sampled frame
//! 2. Compare consecutive histograms using chi-squared distance
//! 3. Mark a cut when the distance exceeds the threshold and the previous
//!    cut is at least `min_scene_frames` samples back
//! 4. Each cut nominates the first sample of the new scene; the rewind
//!    offset then places the keyframe before the cut
//!
//! Chi-squared is robust to gradual illumination changes, so camera exposure
//! drift does not produce cuts. Presenter position is ignored.

use image::RgbImage;
use synopsis_models::{Keyframe, SampledIndex, StrategyKind};
use tracing::{debug, info};

use super::config::SceneConfig;
use super::{check_period, keyframes_from_peaks, KeyframeStrategy};
use crate::error::MediaResult;
use crate::human::HumanDetector;
use crate::source::FrameCursor;

/// Histogram scene-cut strategy.
#[derive(Debug, Clone)]
pub struct SceneStrategy {
    config: SceneConfig,
}

impl SceneStrategy {
    pub fn new(config: SceneConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Sampled indices where a new scene starts.
    ///
    /// Falls back to the last sample when no cut is found.
    pub fn detect_cuts(&self, histograms: &[Vec<f64>]) -> Vec<SampledIndex> {
        if histograms.is_empty() {
            return vec![];
        }

        let mut last_boundary = 0usize;
        let mut cuts = Vec::new();
        for i in 1..histograms.len() {
            let distance = chi_squared_distance(&histograms[i - 1], &histograms[i]);
            if distance <= self.config.threshold {
                continue;
            }
            if i - last_boundary >= self.config.min_scene_frames {
                debug!(
                    "Scene cut at sample {} (distance={:.3}, threshold={:.3})",
                    i, distance, self.config.threshold
                );
                cuts.push(SampledIndex(i));
                last_boundary = i;
            } else {
                debug!(
                    "Ignoring potential cut at sample {} (too close to previous: {} samples)",
                    i,
                    i - last_boundary
                );
            }
        }

        if cuts.is_empty() {
            cuts.push(SampledIndex(histograms.len() - 1));
        }
        cuts
    }

    /// Compute an HSV histogram for an RGB frame.
    ///
    /// Flattened to `bins^3` entries and normalised to sum to one.
    pub fn compute_histogram(&self, image: &RgbImage) -> Vec<f64> {
        let bins = self.config.histogram_bins;
        let mut histogram = vec![0.0; bins * bins * bins];

        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;
            let (h, s, v) = rgb_to_hsv(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);

            // Quantize to bins
            let h_bin = ((h / 360.0) * bins as f64).min(bins as f64 - 1.0) as usize;
            let s_bin = (s * bins as f64).min(bins as f64 - 1.0) as usize;
            let v_bin = (v * bins as f64).min(bins as f64 - 1.0) as usize;

            histogram[h_bin * bins * bins + s_bin * bins + v_bin] += 1.0;
        }

        let total: f64 = histogram.iter().sum();
        if total > 0.0 {
            for val in &mut histogram {
                *val /= total;
            }
        }
        histogram
    }
}

impl KeyframeStrategy for SceneStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Scene
    }

    fn sampling_period(&self) -> usize {
        self.config.period
    }

    fn detect_keyframes(
        &self,
        cursor: &mut FrameCursor,
        _detector: &mut dyn HumanDetector,
    ) -> MediaResult<Vec<Keyframe>> {
        check_period(cursor, self.config.period)?;
        let props = cursor.properties();

        cursor.reset()?;
        let mut histograms = Vec::new();
        while let Some(frame) = cursor.next_frame()? {
            histograms.push(self.compute_histogram(frame.image()));
        }

        let cuts = self.detect_cuts(&histograms);
        info!(
            samples = histograms.len(),
            cuts = cuts.len(),
            "Scene analysis complete"
        );

        let rewind = props.raw_frames_for(self.config.rewind_secs);
        Ok(keyframes_from_peaks(
            cuts,
            self.config.period,
            rewind,
            props.fps,
        ))
    }
}

/// Chi-squared distance between two histograms.
///
/// Formula: `sum((h1[i] - h2[i])^2 / (h1[i] + h2[i] + epsilon)) / 2`
pub fn chi_squared_distance(h1: &[f64], h2: &[f64]) -> f64 {
    const EPSILON: f64 = 1e-10;

    if h1.len() != h2.len() {
        return f64::MAX;
    }

    let distance: f64 = h1
        .iter()
        .zip(h2)
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff / (a + b + EPSILON)
        })
        .sum();
    distance / 2.0
}

/// Convert RGB in [0, 1] to HSV with H in [0, 360) and S, V in [0, 1].
fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, max)
}
