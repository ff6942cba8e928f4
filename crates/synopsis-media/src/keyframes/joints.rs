//! Change detection across segment boundaries.
//!
//! Segment-local calibration never sees the pair formed by the last frame of
//! one segment and the first frame of the next. Each such joint is diffed
//! separately, masked by the union of both frames' human regions, and judged
//! with the calibration of the neighbour that has no presenter.

use synopsis_models::SampledIndex;
use tracing::debug;

use super::calibration::Calibration;
use super::grid::CellAnalyzer;
use super::segmenter::{Segment, SegmentKind};
use crate::error::MediaResult;
use crate::human::HumanRegion;
use crate::source::FrameCursor;

/// Calibration used for the joint between `prev` and `next`.
///
/// Prefers the empty neighbour, falling back to the earlier segment.
pub fn joint_calibration<'a>(
    prev: (&Segment, &'a Calibration),
    next: (&Segment, &'a Calibration),
) -> &'a Calibration {
    match (prev.0.kind, next.0.kind) {
        (SegmentKind::Empty, _) => prev.1,
        (_, SegmentKind::Empty) => next.1,
        _ => prev.1,
    }
}

/// Find joints whose content changed across the boundary.
///
/// Returns the last frame of the earlier segment for each such joint, in
/// ascending order. `calibrations` is parallel to `segments`.
pub fn find_joint_peaks(
    cursor: &mut FrameCursor,
    analyzer: &CellAnalyzer,
    segments: &[Segment],
    calibrations: &[Calibration],
    humans: &[HumanRegion],
) -> MediaResult<Vec<SampledIndex>> {
    let mut peaks = Vec::new();
    for (i, pair) in segments.windows(2).enumerate() {
        let (Some(lhs), Some(rhs)) = (pair[0].last(), pair[1].first()) else {
            continue;
        };

        let lhs_frame = analyzer.load(cursor, lhs)?;
        let rhs_frame = analyzer.load(cursor, rhs)?;
        let mask = region_at(humans, lhs).union(&region_at(humans, rhs));
        let diff = analyzer.diff(&lhs_frame, &rhs_frame, Some(&mask));

        let calibration = joint_calibration(
            (&pair[0], &calibrations[i]),
            (&pair[1], &calibrations[i + 1]),
        );
        let frame_diff = calibration.frame_diff(&diff);
        let changed = frame_diff > calibration.threshold;
        debug!(
            lhs = %lhs,
            rhs = %rhs,
            frame_diff,
            threshold = calibration.threshold,
            changed,
            "Joint evaluated"
        );
        if changed {
            peaks.push(lhs);
        }
    }
    Ok(peaks)
}

pub(crate) fn region_at(humans: &[HumanRegion], index: SampledIndex) -> HumanRegion {
    humans.get(index.get()).copied().unwrap_or(HumanRegion::EMPTY)
}
