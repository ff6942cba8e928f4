//! Statistical helpers shared by the strategies.

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the population standard deviation of a slice of values.
pub fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Calculate the median of a slice of values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Adaptive threshold `mean + coef * stddev`.
///
/// A constant or single-sample series yields exactly its mean.
pub fn adaptive_threshold(values: &[f64], coef: f64) -> f64 {
    mean(values) + coef * std_deviation(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-9);
        assert!((std_deviation(&values) - 2.0).abs() < 1e-9);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_deviation(&[3.0]), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_threshold_of_constant_series_is_mean() {
        let values = [3.0; 12];
        assert_eq!(adaptive_threshold(&values, 4.0), 3.0);
        assert_eq!(adaptive_threshold(&[7.0], 100.0), 7.0);
    }

    #[test]
    fn test_threshold_monotonic_in_coef() {
        let values = [0.0, 1.0, 5.0, 2.0, 0.0, 9.0];
        let mut last = f64::MIN;
        for coef in [0.0, 0.5, 1.0, 2.0, 4.0, 8.0] {
            let t = adaptive_threshold(&values, coef);
            assert!(t > last);
            last = t;
        }
    }
}
