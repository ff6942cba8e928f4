//! Per-segment threshold calibration.

use super::grid::CellDiffMatrix;
use crate::stats::adaptive_threshold;

/// Thresholds learned from one segment's diff history.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// One threshold per cell, row-major
    pub cell_thresholds: Vec<f64>,
    /// Threshold over the frame-level changed-cell counts
    pub threshold: f64,
}

impl Calibration {
    /// Calibrate from a segment's consecutive-pair diffs.
    ///
    /// Returns the calibration together with the frame-level series (one
    /// changed-cell count per pair). A segment without pairs calibrates to
    /// zero thresholds and an empty series.
    pub fn from_diffs(
        diffs: &[CellDiffMatrix],
        cell_coef: f64,
        threshold_coef: f64,
    ) -> (Self, Vec<f64>) {
        let cell_count = diffs.first().map(|d| d.values().len()).unwrap_or(0);
        let cell_thresholds: Vec<f64> = (0..cell_count)
            .map(|cell| {
                let history: Vec<f64> = diffs.iter().map(|d| d.values()[cell]).collect();
                adaptive_threshold(&history, cell_coef)
            })
            .collect();

        let series: Vec<f64> = diffs
            .iter()
            .map(|d| changed_cells(d, &cell_thresholds) as f64)
            .collect();
        let threshold = adaptive_threshold(&series, threshold_coef);

        (
            Self {
                cell_thresholds,
                threshold,
            },
            series,
        )
    }

    /// Frame-level difference of a pair under this calibration.
    pub fn frame_diff(&self, diff: &CellDiffMatrix) -> f64 {
        changed_cells(diff, &self.cell_thresholds) as f64
    }

    /// True if the pair changed more than the segment threshold.
    pub fn exceeds(&self, diff: &CellDiffMatrix) -> bool {
        self.frame_diff(diff) > self.threshold
    }
}

/// Number of cells strictly above their threshold.
pub fn changed_cells(diff: &CellDiffMatrix, thresholds: &[f64]) -> usize {
    diff.values()
        .iter()
        .zip(thresholds)
        .filter(|(value, threshold)| *value > *threshold)
        .count()
}
