//! Peak post-processing: back-off, near-duplicate removal and global spacing.

use synopsis_models::SampledIndex;
use tracing::debug;

use super::calibration::Calibration;
use super::grid::CellAnalyzer;
use super::joints::region_at;
use super::segmenter::Segment;
use crate::error::MediaResult;
use crate::human::HumanRegion;
use crate::source::FrameCursor;

/// Move peaks back by `back_down` positions within the segment's frame list.
///
/// `positions` index into `segment.frames`; results are floored at the
/// segment's first frame.
pub fn back_off_in_segment(segment: &Segment, positions: &[usize], back_down: usize) -> Vec<SampledIndex> {
    positions
        .iter()
        .filter_map(|p| segment.frames.get(p.saturating_sub(back_down)).copied())
        .collect()
}

/// Keep peaks whose content differs from the last accepted one.
///
/// The first peak is always kept. Each later peak is diffed against the last
/// *accepted* peak and kept only if the change exceeds the segment threshold.
pub fn dedup_segment_peaks(
    cursor: &mut FrameCursor,
    analyzer: &CellAnalyzer,
    calibration: &Calibration,
    peaks: &[SampledIndex],
    humans: Option<&[HumanRegion]>,
) -> MediaResult<Vec<SampledIndex>> {
    let Some((&first, rest)) = peaks.split_first() else {
        return Ok(Vec::new());
    };
    if rest.is_empty() {
        return Ok(vec![first]);
    }

    let mut accepted = vec![first];
    let mut last_index = first;
    let mut last_frame = analyzer.load(cursor, first)?;

    for &candidate in rest {
        let frame = analyzer.load(cursor, candidate)?;
        let mask = humans.map(|h| region_at(h, last_index).union(&region_at(h, candidate)));
        let diff = analyzer.diff(&last_frame, &frame, mask.as_ref());
        let frame_diff = calibration.frame_diff(&diff);

        if frame_diff > calibration.threshold {
            accepted.push(candidate);
            last_index = candidate;
            last_frame = frame;
        } else {
            debug!(
                candidate = %candidate,
                last = %last_index,
                frame_diff,
                threshold = calibration.threshold,
                "Dropped near-duplicate peak"
            );
        }
    }
    Ok(accepted)
}

/// Sort, then keep each peak lying more than `min_length` past the last kept one.
///
/// The first peak is always kept. Applying the sweep to its own output is a
/// no-op.
pub fn global_sweep(mut peaks: Vec<SampledIndex>, min_length: usize) -> Vec<SampledIndex> {
    peaks.sort_unstable();
    peaks.dedup();

    let mut kept: Vec<SampledIndex> = Vec::with_capacity(peaks.len());
    for peak in peaks {
        match kept.last() {
            Some(last) if peak.get() - last.get() <= min_length => {}
            _ => kept.push(peak),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframes::segmenter::SegmentKind;
    use crate::source::MemoryFrameSource;
    use image::{Rgb, RgbImage};

    fn indices(values: &[usize]) -> Vec<SampledIndex> {
        values.iter().map(|v| SampledIndex(*v)).collect()
    }

    #[test]
    fn test_back_off_uses_segment_positions() {
        // Frames 4 and 5 were centred and skipped.
        let segment = Segment {
            kind: SegmentKind::Empty,
            frames: indices(&[0, 1, 2, 3, 6, 7, 8]),
        };
        assert_eq!(back_off_in_segment(&segment, &[5, 1], 2), indices(&[3, 0]));
        assert_eq!(back_off_in_segment(&segment, &[6], 0), indices(&[8]));
    }

    #[test]
    fn test_global_sweep_spacing() {
        let peaks = indices(&[30, 3, 10, 12, 9, 17, 3]);
        let swept = global_sweep(peaks, 5);
        assert_eq!(swept, indices(&[3, 9, 17, 30]));
        assert!(swept.windows(2).all(|w| w[1].get() - w[0].get() > 5));
    }

    #[test]
    fn test_global_sweep_is_idempotent() {
        let swept = global_sweep(indices(&[0, 2, 4, 6, 8, 10, 12, 14]), 3);
        assert_eq!(swept, indices(&[0, 4, 8, 12]));
        assert_eq!(global_sweep(swept.clone(), 3), swept);
        assert!(global_sweep(vec![], 3).is_empty());
    }

    fn grey_cursor(levels: &[u8]) -> FrameCursor {
        let frames = levels
            .iter()
            .map(|v| RgbImage::from_pixel(16, 16, Rgb([*v, *v, *v])))
            .collect();
        FrameCursor::new(MemoryFrameSource::new(frames, 10.0), 1).unwrap()
    }

    fn calibration() -> Calibration {
        // A pair counts as changed when at least two cells move by more than 10.
        Calibration {
            cell_thresholds: vec![10.0; 4],
            threshold: 1.0,
        }
    }

    #[test]
    fn test_dedup_compares_against_last_accepted() {
        let mut levels = vec![0u8; 13];
        levels[0] = 50;
        levels[5] = 56;
        levels[9] = 62;
        levels[12] = 62;
        let mut cursor = grey_cursor(&levels);
        let analyzer = CellAnalyzer::new(16, 16, 1.0, 2, 2).unwrap();

        // 5 is within noise of 0. 9 is within noise of 5 but not of 0.
        let accepted = dedup_segment_peaks(
            &mut cursor,
            &analyzer,
            &calibration(),
            &indices(&[0, 5, 9, 12]),
            None,
        )
        .unwrap();
        assert_eq!(accepted, indices(&[0, 9]));
    }

    #[test]
    fn test_dedup_keeps_distinct_later_peak() {
        let mut levels = vec![0u8; 10];
        levels[0] = 50;
        levels[5] = 52;
        levels[9] = 200;
        let mut cursor = grey_cursor(&levels);
        let analyzer = CellAnalyzer::new(16, 16, 1.0, 2, 2).unwrap();

        let accepted = dedup_segment_peaks(
            &mut cursor,
            &analyzer,
            &calibration(),
            &indices(&[0, 5, 9]),
            None,
        )
        .unwrap();
        assert_eq!(accepted, indices(&[0, 9]));

        let single = dedup_segment_peaks(&mut cursor, &analyzer, &calibration(), &indices(&[5]), None);
        assert_eq!(single.unwrap(), indices(&[5]));
    }
}
