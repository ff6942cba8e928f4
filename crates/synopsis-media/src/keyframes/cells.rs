//! Cell-grid keyframe strategy.
//!
//! # Algorithm
//!
//! 1. Detect the presenter on every sampled frame and classify its position
//! 2. Split the timeline into `EMPTY` / `HUMAN_SIDE` segments, dropping
//!    centred (talking-head) frames and short runs
//! 3. Per segment, diff consecutive frames cell by cell, learn per-cell and
//!    per-segment thresholds, and count changed cells per pair
//! 4. Detect peaks of the changed-cell series, forcing a closing peak
//! 5. Back each peak off, drop near-duplicates, add changes across segment
//!    joints, and enforce one global minimum spacing
//!
//! The cursor is walked forward once per pass: detection, segment diffs,
//! duplicate removal and joints.

use image::GrayImage;
use synopsis_models::{Keyframe, SampledIndex, StrategyKind};
use tracing::{debug, info};

use super::calibration::Calibration;
use super::config::CellsConfig;
use super::grid::{CellAnalyzer, CellDiffMatrix};
use super::joints::{find_joint_peaks, region_at};
use super::peaks::{detect_peaks, push_terminal};
use super::postprocess::{back_off_in_segment, dedup_segment_peaks, global_sweep};
use super::segmenter::{build_segments, Segment};
use super::{check_period, keyframes_from_peaks, KeyframeStrategy};
use crate::error::MediaResult;
use crate::human::{detect_all, HumanDetector, HumanRegion, Presence};
use crate::source::FrameCursor;

/// Per-segment analysis results.
#[derive(Debug, Clone)]
pub struct SegmentAnalysis {
    pub segment: Segment,
    pub calibration: Calibration,
    /// Changed-cell count per consecutive pair
    pub series: Vec<f64>,
    /// Detected peaks, including a forced closing peak
    pub peaks: Vec<SampledIndex>,
    /// Peaks left after back-off and duplicate removal
    pub accepted: Vec<SampledIndex>,
}

/// Full result of one cells run.
#[derive(Debug, Clone)]
pub struct CellsAnalysis {
    pub humans: Vec<HumanRegion>,
    pub segments: Vec<SegmentAnalysis>,
    /// Backed-off joint peaks
    pub joint_peaks: Vec<SampledIndex>,
    /// Final ascending keyframe indices
    pub peaks: Vec<SampledIndex>,
    pub min_length_frames: usize,
    pub back_down_frames: usize,
}

/// Cell-grid strategy with human-presence segmentation.
#[derive(Debug, Clone)]
pub struct CellsStrategy {
    config: CellsConfig,
}

impl CellsStrategy {
    pub fn new(config: CellsConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CellsConfig {
        &self.config
    }

    /// Run the full analysis, keeping intermediate results.
    pub fn analyze(
        &self,
        cursor: &mut FrameCursor,
        detector: &mut dyn HumanDetector,
    ) -> MediaResult<CellsAnalysis> {
        let config = &self.config;
        check_period(cursor, config.period)?;
        let props = cursor.properties();
        let min_length = props.sampled_frames_for(config.min_length_secs, config.period);
        let back_down = props.sampled_frames_for(config.back_down_secs, config.period);
        let analyzer = CellAnalyzer::new(
            props.width,
            props.height,
            config.resize_coef,
            config.grid_cols,
            config.grid_rows,
        )?;
        let min_peak_value = config.min_peak_cell_fraction * analyzer.grid().len() as f64;

        let humans = detect_all(cursor, detector, config.presence.smoothing_kernel)?;
        let presences: Vec<Presence> = humans
            .iter()
            .map(|h| config.presence.classify(h, props.width, props.height))
            .collect();
        let segments = build_segments(&presences, min_length);
        info!(
            frames = humans.len(),
            segments = segments.len(),
            min_length,
            back_down,
            grid_cols = analyzer.grid().cols(),
            grid_rows = analyzer.grid().rows(),
            "Segments built"
        );

        let mut analyses = Vec::with_capacity(segments.len());
        let mut positions_by_segment = Vec::with_capacity(segments.len());
        for segment in segments {
            let diffs = self.segment_diffs(cursor, &analyzer, &segment, &humans)?;
            let (calibration, series) =
                Calibration::from_diffs(&diffs, config.cell_threshold_coef, config.threshold_coef);

            let mut positions =
                detect_peaks(&series, calibration.threshold, min_peak_value, min_length);
            push_terminal(&mut positions, segment.len(), min_length);
            let peaks: Vec<SampledIndex> = positions.iter().map(|p| segment.frames[*p]).collect();

            debug!(
                kind = segment.kind.as_str(),
                first = ?segment.first(),
                frames = segment.len(),
                threshold = calibration.threshold,
                peaks = peaks.len(),
                "Segment analysed"
            );
            positions_by_segment.push(positions);
            analyses.push(SegmentAnalysis {
                segment,
                calibration,
                series,
                peaks,
                accepted: Vec::new(),
            });
        }

        let mask = config.mask_segment_humans.then_some(humans.as_slice());
        for (analysis, positions) in analyses.iter_mut().zip(&positions_by_segment) {
            let candidates = back_off_in_segment(&analysis.segment, positions, back_down);
            analysis.accepted =
                dedup_segment_peaks(cursor, &analyzer, &analysis.calibration, &candidates, mask)?;
        }

        let segment_list: Vec<Segment> = analyses.iter().map(|a| a.segment.clone()).collect();
        let calibrations: Vec<Calibration> =
            analyses.iter().map(|a| a.calibration.clone()).collect();
        let joint_peaks: Vec<SampledIndex> =
            find_joint_peaks(cursor, &analyzer, &segment_list, &calibrations, &humans)?
                .into_iter()
                .map(|p| p.back_off(back_down))
                .collect();

        let mut all_peaks = joint_peaks.clone();
        for analysis in &analyses {
            all_peaks.extend(analysis.accepted.iter().copied());
        }
        let candidates = all_peaks.len();
        let peaks = global_sweep(all_peaks, min_length);

        info!(
            segments = analyses.len(),
            joint_peaks = joint_peaks.len(),
            candidates,
            keyframes = peaks.len(),
            rewinds = cursor.rewinds(),
            "Cells analysis complete"
        );

        Ok(CellsAnalysis {
            humans,
            segments: analyses,
            joint_peaks,
            peaks,
            min_length_frames: min_length,
            back_down_frames: back_down,
        })
    }

    /// Diffs of every consecutive pair inside a segment.
    fn segment_diffs(
        &self,
        cursor: &mut FrameCursor,
        analyzer: &CellAnalyzer,
        segment: &Segment,
        humans: &[HumanRegion],
    ) -> MediaResult<Vec<CellDiffMatrix>> {
        let mut diffs = Vec::with_capacity(segment.len().saturating_sub(1));
        let mut previous: Option<(SampledIndex, GrayImage)> = None;

        for &index in &segment.frames {
            let frame = analyzer.load(cursor, index)?;
            if let Some((prev_index, prev_frame)) = &previous {
                let mask = self
                    .config
                    .mask_segment_humans
                    .then(|| region_at(humans, *prev_index).union(&region_at(humans, index)));
                diffs.push(analyzer.diff(prev_frame, &frame, mask.as_ref()));
            }
            previous = Some((index, frame));
        }
        Ok(diffs)
    }
}

impl KeyframeStrategy for CellsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Cells
    }

    fn sampling_period(&self) -> usize {
        self.config.period
    }

    fn detect_keyframes(
        &self,
        cursor: &mut FrameCursor,
        detector: &mut dyn HumanDetector,
    ) -> MediaResult<Vec<Keyframe>> {
        let analysis = self.analyze(cursor, detector)?;
        let props = cursor.properties();
        let rewind = props.raw_frames_for(self.config.rewind_secs);
        Ok(keyframes_from_peaks(
            analysis.peaks,
            self.config.period,
            rewind,
            props.fps,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::human::{NoHumanDetector, PrecomputedHumans};
    use crate::source::MemoryFrameSource;
    use image::{Rgb, RgbImage};

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(40, 30, Rgb([value, value, value]))
    }

    fn small_config() -> CellsConfig {
        CellsConfig::default()
            .with_period(1)
            .with_grid(4, 3)
            .with_resize_coef(1.0)
            .with_min_length_secs(0.5)
            .with_back_down_secs(0.0)
            .with_threshold_coefs(2.0, 2.0)
    }

    #[test]
    fn test_static_video_yields_single_closing_keyframe() {
        let frames = (0..30).map(|_| solid(80)).collect();
        let mut cursor = FrameCursor::new(MemoryFrameSource::new(frames, 10.0), 1).unwrap();
        let strategy = CellsStrategy::new(small_config()).unwrap();

        let keyframes = strategy
            .detect_keyframes(&mut cursor, &mut NoHumanDetector)
            .unwrap();
        assert_eq!(keyframes.len(), 1);
        assert_eq!(keyframes[0].index, SampledIndex(29));
    }

    #[test]
    fn test_changes_in_empty_video() {
        // Three slides, changing after frames 9 and 24.
        let frames = (0..40)
            .map(|i| match i {
                0..=9 => solid(20),
                10..=24 => solid(120),
                _ => solid(220),
            })
            .collect();
        let mut cursor = FrameCursor::new(MemoryFrameSource::new(frames, 10.0), 1).unwrap();
        let strategy = CellsStrategy::new(small_config()).unwrap();

        let analysis = strategy.analyze(&mut cursor, &mut NoHumanDetector).unwrap();
        assert_eq!(analysis.segments.len(), 1);
        assert_eq!(
            analysis.peaks,
            vec![SampledIndex(9), SampledIndex(24), SampledIndex(39)]
        );
        assert!(analysis.joint_peaks.is_empty());
    }

    #[test]
    fn test_centred_presenter_is_excluded() {
        let frames = (0..20).map(|i| solid(i as u8 * 10)).collect();
        let mut cursor = FrameCursor::new(MemoryFrameSource::new(frames, 10.0), 1).unwrap();
        let centre = HumanRegion::new(15, 25, 0, 30);
        let mut humans = PrecomputedHumans::new(vec![Some(centre); 20]);
        let strategy = CellsStrategy::new(small_config()).unwrap();

        let analysis = strategy.analyze(&mut cursor, &mut humans).unwrap();
        assert!(analysis.segments.is_empty());
        assert!(analysis.peaks.is_empty());
    }

    #[test]
    fn test_period_mismatch_rejected() {
        let frames = (0..6).map(|_| solid(0)).collect();
        let mut cursor = FrameCursor::new(MemoryFrameSource::new(frames, 10.0), 2).unwrap();
        let strategy = CellsStrategy::new(small_config()).unwrap();
        let err = strategy
            .detect_keyframes(&mut cursor, &mut NoHumanDetector)
            .unwrap_err();
        assert!(err.is_config_error());
    }
}
