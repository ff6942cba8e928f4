//! Naive whole-frame keyframe strategy.
//!
//! One scalar difference per consecutive pair, with the presenter's column
//! band blanked out. The peak threshold is raised step by step until the peak
//! count fits a per-minute cap, and peaks preceded by unsettled footage
//! (ongoing motion or a centred presenter) are rejected.

use image::GrayImage;
use synopsis_models::{Keyframe, SampledIndex, StrategyKind};
use tracing::{debug, info};

use super::config::NaiveConfig;
use super::peaks::{local_maxima, normalized_threshold, suppress_close};
use super::{check_period, keyframes_from_peaks, KeyframeStrategy};
use crate::error::MediaResult;
use crate::frame::VideoProperties;
use crate::human::{detect_all, HumanDetector, HumanRegion};
use crate::source::FrameCursor;
use crate::stats::mean;

/// Mean absolute luma difference outside the presenter's padded column band.
pub fn masked_frame_diff(
    lhs: &GrayImage,
    rhs: &GrayImage,
    region: &HumanRegion,
    padding: f64,
) -> f64 {
    let (width, height) = lhs.dimensions();
    let (band_left, band_right) = if region.is_empty() {
        (0, 0)
    } else {
        let pad = region.width() as f64 * padding;
        let left = (region.x_min as f64 - pad).max(0.0) as u32;
        let right = ((region.x_max as f64 + pad) as u32).min(width);
        (left.min(right), right)
    };

    let mut sum: u64 = 0;
    for (l_row, r_row) in lhs
        .as_raw()
        .chunks_exact(width.max(1) as usize)
        .zip(rhs.as_raw().chunks_exact(width.max(1) as usize))
    {
        for (x, (a, b)) in l_row.iter().zip(r_row).enumerate() {
            let x = x as u32;
            if x >= band_left && x < band_right {
                continue;
            }
            sum += a.abs_diff(*b) as u64;
        }
    }

    let pixels = width as u64 * height as u64;
    let masked = height as u64 * (band_right - band_left) as u64;
    sum as f64 / pixels.saturating_sub(masked).max(1) as f64
}

/// Whole-frame strategy with an adaptive peak threshold.
#[derive(Debug, Clone)]
pub struct NaiveStrategy {
    config: NaiveConfig,
}

/// Inputs shared by every threshold pass.
struct PeakSearch<'a> {
    diffs: &'a [f64],
    humans: &'a [HumanRegion],
    width: u32,
    bottom_line: f64,
    window: usize,
    config: &'a NaiveConfig,
}

impl PeakSearch<'_> {
    /// One detection pass at normalised threshold `t`.
    fn pass(&self, t: f64) -> Vec<usize> {
        let floor = normalized_threshold(self.diffs, t);
        let candidates: Vec<usize> = local_maxima(self.diffs)
            .into_iter()
            .filter(|i| self.diffs[*i] > floor)
            .collect();
        let mut peaks = suppress_close(self.diffs, &candidates, self.window);

        let last = self.diffs.len() - 1;
        match peaks.last() {
            None => peaks.push(last),
            Some(&peak) if self.diffs.len() - peak > self.window && peak != last => {
                peaks.push(last)
            }
            Some(_) => {}
        }

        peaks.retain(|peak| !self.is_unsettled(*peak));
        peaks
    }

    /// True if the footage before `index` has not settled.
    ///
    /// Looks back over `window - 1` pairs; more than half of them moving
    /// above the badness floor, or showing a centred presenter, is unsettled.
    fn is_unsettled(&self, index: usize) -> bool {
        if index < self.window {
            return true;
        }
        let mut moving = 0;
        let mut centred = 0;
        for back in 1..self.window {
            let i = index - back;
            if self.diffs[i] > self.bottom_line {
                moving += 1;
            }
            let region = self.humans.get(i).copied().unwrap_or(HumanRegion::EMPTY);
            if self.config.presence.is_centered(&region, self.width) {
                centred += 1;
            }
        }
        moving.max(centred) > self.window / 2
    }
}

impl NaiveStrategy {
    pub fn new(config: NaiveConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NaiveConfig {
        &self.config
    }

    /// Peak count cap for a video: `max(per_min / 60 * duration, 1)`.
    fn keyframe_cap(&self, props: &VideoProperties, sampled: usize) -> f64 {
        let duration = if props.frame_count > 0 {
            props.duration_secs()
        } else {
            // Unknown length: estimate from the samples read.
            (sampled * self.config.period) as f64 / props.fps
        };
        (self.config.max_keyframes_per_min / 60.0 * duration).max(1.0)
    }

    /// Sampled indices of the selected peaks.
    pub fn find_peaks(
        &self,
        cursor: &mut FrameCursor,
        detector: &mut dyn HumanDetector,
    ) -> MediaResult<Vec<SampledIndex>> {
        let config = &self.config;
        check_period(cursor, config.period)?;
        let props = cursor.properties();

        let humans = detect_all(cursor, detector, config.presence.smoothing_kernel)?;
        let diffs = self.frame_diffs(cursor, &humans)?;
        if diffs.is_empty() {
            info!(frames = humans.len(), "Too few frames for naive detection");
            return Ok(Vec::new());
        }

        let window = props.sampled_frames_for(config.secs_between_keyframes, config.period);
        let search = PeakSearch {
            diffs: &diffs,
            humans: &humans,
            width: props.width,
            bottom_line: mean(&diffs) * config.bottom_line_coef,
            window,
            config,
        };
        let cap = self.keyframe_cap(&props, humans.len());

        let mut peaks = Vec::new();
        let mut pass = 0usize;
        loop {
            let t = config.initial_threshold + pass as f64 * config.threshold_step;
            let over_cap = pass == 0 || peaks.len() as f64 > cap;
            if !over_cap || t > 1.0 + 1e-9 {
                break;
            }
            peaks = search.pass(t);
            debug!(pass, threshold = t, peaks = peaks.len(), cap, "Naive threshold pass");
            pass += 1;
        }

        info!(
            pairs = diffs.len(),
            bottom_line = search.bottom_line,
            window,
            passes = pass,
            keyframes = peaks.len(),
            "Naive analysis complete"
        );
        Ok(peaks.into_iter().map(SampledIndex).collect())
    }

    /// Masked diff of every consecutive sampled pair, in one forward pass.
    fn frame_diffs(&self, cursor: &mut FrameCursor, humans: &[HumanRegion]) -> MediaResult<Vec<f64>> {
        cursor.reset()?;
        let mut diffs = Vec::with_capacity(humans.len().saturating_sub(1));
        let mut previous: Option<GrayImage> = None;

        while let Some(frame) = cursor.next_frame()? {
            let index = frame.index().get();
            let luma = frame.luma();
            if let Some(prev) = &previous {
                let region_at = |i: usize| humans.get(i).copied().unwrap_or(HumanRegion::EMPTY);
                let region = region_at(index - 1).union(&region_at(index));
                diffs.push(masked_frame_diff(prev, &luma, &region, self.config.human_padding));
            }
            previous = Some(luma);
        }
        Ok(diffs)
    }
}

impl KeyframeStrategy for NaiveStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Naive
    }

    fn sampling_period(&self) -> usize {
        self.config.period
    }

    fn detect_keyframes(
        &self,
        cursor: &mut FrameCursor,
        detector: &mut dyn HumanDetector,
    ) -> MediaResult<Vec<Keyframe>> {
        let peaks = self.find_peaks(cursor, detector)?;
        let props = cursor.properties();
        let rewind = props.raw_frames_for(self.config.rewind_secs);
        Ok(keyframes_from_peaks(
            peaks,
            self.config.period,
            rewind,
            props.fps,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::human::{HumanPresenceConfig, NoHumanDetector, PrecomputedHumans};
    use crate::source::MemoryFrameSource;
    use image::{Luma, Rgb, RgbImage};

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(20, 10, Rgb([value, value, value]))
    }

    fn config() -> NaiveConfig {
        NaiveConfig::default()
            .with_period(1)
            .with_secs_between_keyframes(1.0)
            .with_rewind_secs(0.0)
            .with_max_keyframes_per_min(60.0)
    }

    #[test]
    fn test_masked_diff_excludes_band() {
        let lhs = GrayImage::from_pixel(20, 10, Luma([0]));
        let mut rhs = lhs.clone();
        for y in 0..10 {
            for x in 0..10 {
                rhs.put_pixel(x, y, Luma([100]));
            }
        }
        // Unmasked: half the pixels changed by 100.
        assert_eq!(masked_frame_diff(&lhs, &rhs, &HumanRegion::EMPTY, 0.15), 50.0);
        // Masking columns 0..10 hides every change.
        let region = HumanRegion::new(0, 10, 0, 10);
        assert_eq!(masked_frame_diff(&lhs, &rhs, &region, 0.0), 0.0);
        // Full mask leaves a floored denominator.
        let full = HumanRegion::new(0, 20, 0, 10);
        assert_eq!(masked_frame_diff(&lhs, &rhs, &full, 0.15), 0.0);
    }

    #[test]
    fn test_settled_change_is_detected() {
        // Slide change after frame 24 of 50 at 10 fps.
        let frames = (0..50)
            .map(|i| if i < 25 { solid(30) } else { solid(200) })
            .collect();
        let mut cursor = FrameCursor::new(MemoryFrameSource::new(frames, 10.0), 1).unwrap();
        let strategy = NaiveStrategy::new(config()).unwrap();

        let peaks = strategy.find_peaks(&mut cursor, &mut NoHumanDetector).unwrap();
        assert_eq!(peaks, vec![SampledIndex(24), SampledIndex(48)]);
    }

    #[test]
    fn test_centred_presenter_rejects_peaks() {
        let frames = (0..50)
            .map(|i| if i < 25 { solid(30) } else { solid(200) })
            .collect();
        let mut cursor = FrameCursor::new(MemoryFrameSource::new(frames, 10.0), 1).unwrap();
        let centre = HumanRegion::new(9, 11, 0, 10);
        let mut humans = PrecomputedHumans::new(vec![Some(centre); 50]);
        let strategy =
            NaiveStrategy::new(config().with_presence(HumanPresenceConfig::default())).unwrap();

        let peaks = strategy.find_peaks(&mut cursor, &mut humans).unwrap();
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_single_frame_video() {
        let mut cursor =
            FrameCursor::new(MemoryFrameSource::new(vec![solid(0)], 10.0), 1).unwrap();
        let strategy = NaiveStrategy::new(config()).unwrap();
        let keyframes = strategy
            .detect_keyframes(&mut cursor, &mut NoHumanDetector)
            .unwrap();
        assert!(keyframes.is_empty());
    }
}
