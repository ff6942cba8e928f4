//! Peak detection over frame-level difference series.
//!
//! Entry `i` of a series scores the pair `(f_i, f_{i+1})`; a peak at `i`
//! nominates `f_i`, the last frame before the change.

use std::cmp::Ordering;

/// Strict local maxima: a rise followed by a fall.
///
/// Plateaus are reported at their left edge. Endpoints are never peaks.
pub fn local_maxima(series: &[f64]) -> Vec<usize> {
    let n = series.len();
    let mut peaks = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        if series[i] > series[i - 1] {
            let mut end = i;
            while end + 1 < n && series[end + 1] == series[i] {
                end += 1;
            }
            if end + 1 < n && series[end + 1] < series[i] {
                peaks.push(i);
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }
    peaks
}

/// Drop candidates within `min_distance` of a higher one.
///
/// Candidates are visited by descending height (earlier first on ties);
/// each kept candidate removes every other within `min_distance`. The result
/// is ascending and pairwise more than `min_distance` apart.
pub fn suppress_close(series: &[f64], candidates: &[usize], min_distance: usize) -> Vec<usize> {
    if min_distance == 0 || candidates.len() < 2 {
        return candidates.to_vec();
    }

    let mut order = candidates.to_vec();
    order.sort_by(|a, b| {
        series[*b]
            .partial_cmp(&series[*a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    });

    let mut kept: Vec<usize> = Vec::new();
    for candidate in order {
        if kept.iter().all(|k| k.abs_diff(candidate) > min_distance) {
            kept.push(candidate);
        }
    }
    kept.sort_unstable();
    kept
}

/// Local maxima strictly above `threshold` and `min_value`, spaced by more
/// than `min_distance`.
pub fn detect_peaks(series: &[f64], threshold: f64, min_value: f64, min_distance: usize) -> Vec<usize> {
    let candidates: Vec<usize> = local_maxima(series)
        .into_iter()
        .filter(|i| series[*i] > threshold && series[*i] > min_value)
        .collect();
    suppress_close(series, &candidates, min_distance)
}

/// Peakutils-style normalised threshold `min + t * (max - min)`.
pub fn normalized_threshold(series: &[f64], t: f64) -> f64 {
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0.0;
    }
    min + t * (max - min)
}

/// Append the last position `frame_count - 1` when it lies more than
/// `min_distance` past the last peak, or when there are no peaks.
pub fn push_terminal(peaks: &mut Vec<usize>, frame_count: usize, min_distance: usize) {
    let Some(last) = frame_count.checked_sub(1) else {
        return;
    };
    match peaks.last() {
        None => peaks.push(last),
        Some(&peak) if last > peak && last - peak > min_distance => peaks.push(last),
        Some(_) => {}
    }
}
