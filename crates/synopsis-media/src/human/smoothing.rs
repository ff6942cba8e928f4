//! Presence smoothing for flickering detections.
//!
//! Detectors miss the presenter on isolated frames. A median filter over the
//! 0/1 presence series finds such gaps, and each gap frame receives a region
//! interpolated from its nearest detected neighbours. Detected frames are
//! never removed.

use tracing::debug;

use super::region::HumanRegion;
use crate::stats::median;

/// Fill detection gaps using a median filter of width `kernel` (odd).
///
/// The filter zero-pads beyond both ends of the series.
pub fn smooth_presence(regions: &[HumanRegion], kernel: usize) -> Vec<HumanRegion> {
    if kernel <= 1 || regions.is_empty() {
        return regions.to_vec();
    }

    let presence: Vec<f64> = regions
        .iter()
        .map(|r| if r.is_empty() { 0.0 } else { 1.0 })
        .collect();
    let half = kernel / 2;

    let mut filled = 0usize;
    let smoothed = regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            if !region.is_empty() {
                return *region;
            }
            let window: Vec<f64> = (0..kernel)
                .map(|k| {
                    (i + k)
                        .checked_sub(half)
                        .and_then(|j| presence.get(j).copied())
                        .unwrap_or(0.0)
                })
                .collect();
            if median(&window) < 0.5 {
                return *region;
            }
            filled += 1;
            interpolate(regions, i)
        })
        .collect();

    debug!(filled, kernel, "Presence smoothing filled detection gaps");
    smoothed
}

/// Average of the nearest non-empty regions on each side of `index`.
///
/// Under zero padding a gap only reaches the median threshold with detections
/// on both sides, so a one-sided gap is never filled.
fn interpolate(regions: &[HumanRegion], index: usize) -> HumanRegion {
    let left = regions[..index].iter().rev().find(|r| !r.is_empty());
    let right = regions[index + 1..].iter().find(|r| !r.is_empty());

    match (left, right) {
        (Some(l), Some(r)) => HumanRegion::new(
            average(l.x_min, r.x_min),
            average(l.x_max, r.x_max),
            average(l.y_min, r.y_min),
            average(l.y_max, r.y_max),
        ),
        _ => HumanRegion::EMPTY,
    }
}

fn average(a: u32, b: u32) -> u32 {
    ((a as u64 + b as u64) / 2) as u32
}
