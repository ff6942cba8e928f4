//! Strategy configuration.
//!
//! Defaults are tuned for 25-30 fps lecture recordings. Every seconds-based
//! window is converted to sampled frames as `floor(secs * fps / period)`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use synopsis_models::StrategyKind;

use crate::error::{MediaError, MediaResult};
use crate::human::HumanPresenceConfig;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn presence_from_env(prefix: &str) -> HumanPresenceConfig {
    let defaults = HumanPresenceConfig::default();
    HumanPresenceConfig {
        center_band_left: env_or(&format!("{prefix}_CENTER_LEFT"), defaults.center_band_left),
        center_band_right: env_or(&format!("{prefix}_CENTER_RIGHT"), defaults.center_band_right),
        dominant_area_fraction: env_or(
            &format!("{prefix}_DOMINANT_AREA"),
            defaults.dominant_area_fraction,
        ),
        smoothing_kernel: std::env::var(format!("{prefix}_SMOOTHING_KERNEL"))
            .ok()
            .and_then(|s| s.parse().ok()),
    }
}

fn check_positive(name: &str, value: f64) -> MediaResult<()> {
    if value.is_nan() || value <= 0.0 {
        return Err(MediaError::config(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> MediaResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(MediaError::config(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_period(period: usize) -> MediaResult<()> {
    if period == 0 {
        return Err(MediaError::config("Sampling period must be at least 1"));
    }
    Ok(())
}

/// Configuration for the cell-grid strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellsConfig {
    /// Sampling period P (one frame analysed out of every P)
    pub period: usize,
    /// Grid columns before remainder adjustment
    pub grid_cols: usize,
    /// Grid rows before remainder adjustment
    pub grid_rows: usize,
    /// Minimum segment length and minimum keyframe spacing, in seconds
    pub min_length_secs: f64,
    /// Downscale factor applied to frames before differencing, in (0, 1]
    pub resize_coef: f64,
    /// Back-off applied to each peak, in seconds
    pub back_down_secs: f64,
    /// `k` in the per-cell threshold `mean + k * stddev`
    pub cell_threshold_coef: f64,
    /// `k` in the per-segment threshold `mean + k * stddev`
    pub threshold_coef: f64,
    /// A peak must change more than this fraction of all cells
    pub min_peak_cell_fraction: f64,
    /// Mask human regions when diffing pairs inside a segment
    pub mask_segment_humans: bool,
    /// Seconds subtracted from each keyframe's raw frame
    pub rewind_secs: f64,
    /// Presenter classification
    pub presence: HumanPresenceConfig,
}

impl Default for CellsConfig {
    fn default() -> Self {
        Self {
            period: 3,
            grid_cols: 16,
            grid_rows: 9,
            min_length_secs: 1.0,
            resize_coef: 0.5,
            back_down_secs: 0.5,
            cell_threshold_coef: 4.0,
            threshold_coef: 4.0,
            min_peak_cell_fraction: 0.15,
            mask_segment_humans: true,
            rewind_secs: 0.0,
            presence: HumanPresenceConfig::default(),
        }
    }
}

impl CellsConfig {
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_grid(mut self, cols: usize, rows: usize) -> Self {
        self.grid_cols = cols;
        self.grid_rows = rows;
        self
    }

    pub fn with_min_length_secs(mut self, secs: f64) -> Self {
        self.min_length_secs = secs;
        self
    }

    pub fn with_resize_coef(mut self, coef: f64) -> Self {
        self.resize_coef = coef;
        self
    }

    pub fn with_back_down_secs(mut self, secs: f64) -> Self {
        self.back_down_secs = secs;
        self
    }

    /// Set both threshold coefficients.
    pub fn with_threshold_coefs(mut self, cell: f64, segment: f64) -> Self {
        self.cell_threshold_coef = cell;
        self.threshold_coef = segment;
        self
    }

    pub fn with_min_peak_cell_fraction(mut self, fraction: f64) -> Self {
        self.min_peak_cell_fraction = fraction;
        self
    }

    pub fn with_rewind_secs(mut self, secs: f64) -> Self {
        self.rewind_secs = secs;
        self
    }

    pub fn with_presence(mut self, presence: HumanPresenceConfig) -> Self {
        self.presence = presence;
        self
    }

    pub fn validate(&self) -> MediaResult<()> {
        check_period(self.period)?;
        if self.grid_cols == 0 || self.grid_rows == 0 {
            return Err(MediaError::config(format!(
                "Grid must have at least one cell, got {}x{}",
                self.grid_cols, self.grid_rows
            )));
        }
        if !(self.resize_coef > 0.0 && self.resize_coef <= 1.0) {
            return Err(MediaError::config(format!(
                "resize_coef must be in (0, 1], got {}",
                self.resize_coef
            )));
        }
        check_positive("min_length_secs", self.min_length_secs)?;
        check_non_negative("back_down_secs", self.back_down_secs)?;
        check_non_negative("cell_threshold_coef", self.cell_threshold_coef)?;
        check_non_negative("threshold_coef", self.threshold_coef)?;
        check_non_negative("rewind_secs", self.rewind_secs)?;
        if !(0.0..=1.0).contains(&self.min_peak_cell_fraction) {
            return Err(MediaError::config(format!(
                "min_peak_cell_fraction must be in [0, 1], got {}",
                self.min_peak_cell_fraction
            )));
        }
        self.presence.validate()
    }

    /// Load from `SYNOPSIS_CELLS_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            period: env_or("SYNOPSIS_CELLS_PERIOD", defaults.period),
            grid_cols: env_or("SYNOPSIS_CELLS_GRID_COLS", defaults.grid_cols),
            grid_rows: env_or("SYNOPSIS_CELLS_GRID_ROWS", defaults.grid_rows),
            min_length_secs: env_or("SYNOPSIS_CELLS_MIN_LENGTH_SECS", defaults.min_length_secs),
            resize_coef: env_or("SYNOPSIS_CELLS_RESIZE_COEF", defaults.resize_coef),
            back_down_secs: env_or("SYNOPSIS_CELLS_BACK_DOWN_SECS", defaults.back_down_secs),
            cell_threshold_coef: env_or(
                "SYNOPSIS_CELLS_CELL_THRESHOLD_COEF",
                defaults.cell_threshold_coef,
            ),
            threshold_coef: env_or("SYNOPSIS_CELLS_THRESHOLD_COEF", defaults.threshold_coef),
            min_peak_cell_fraction: env_or(
                "SYNOPSIS_CELLS_MIN_PEAK_CELL_FRACTION",
                defaults.min_peak_cell_fraction,
            ),
            mask_segment_humans: env_or(
                "SYNOPSIS_CELLS_MASK_SEGMENT_HUMANS",
                defaults.mask_segment_humans,
            ),
            rewind_secs: env_or("SYNOPSIS_CELLS_REWIND_SECS", defaults.rewind_secs),
            presence: presence_from_env("SYNOPSIS_CELLS"),
        }
    }
}

/// Configuration for the naive whole-frame strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveConfig {
    pub period: usize,
    /// Badness floor is `mean(diffs) * bottom_line_coef`
    pub bottom_line_coef: f64,
    /// Minimum keyframe spacing and look-back window, in seconds
    pub secs_between_keyframes: f64,
    /// First normalised peak threshold tried
    pub initial_threshold: f64,
    /// Threshold increment between passes
    pub threshold_step: f64,
    /// Peak count cap, per minute of video
    pub max_keyframes_per_min: f64,
    /// Horizontal padding around the human mask, as a fraction of its width
    pub human_padding: f64,
    pub rewind_secs: f64,
    pub presence: HumanPresenceConfig,
}

impl Default for NaiveConfig {
    fn default() -> Self {
        Self {
            period: 3,
            bottom_line_coef: 3.0,
            secs_between_keyframes: 4.0,
            initial_threshold: 0.08,
            threshold_step: 0.02,
            max_keyframes_per_min: 4.0,
            human_padding: 0.15,
            rewind_secs: 1.0,
            presence: HumanPresenceConfig::default(),
        }
    }
}

impl NaiveConfig {
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_secs_between_keyframes(mut self, secs: f64) -> Self {
        self.secs_between_keyframes = secs;
        self
    }

    pub fn with_max_keyframes_per_min(mut self, max: f64) -> Self {
        self.max_keyframes_per_min = max;
        self
    }

    pub fn with_bottom_line_coef(mut self, coef: f64) -> Self {
        self.bottom_line_coef = coef;
        self
    }

    pub fn with_rewind_secs(mut self, secs: f64) -> Self {
        self.rewind_secs = secs;
        self
    }

    pub fn with_presence(mut self, presence: HumanPresenceConfig) -> Self {
        self.presence = presence;
        self
    }

    pub fn validate(&self) -> MediaResult<()> {
        check_period(self.period)?;
        check_positive("secs_between_keyframes", self.secs_between_keyframes)?;
        check_positive("threshold_step", self.threshold_step)?;
        check_positive("max_keyframes_per_min", self.max_keyframes_per_min)?;
        check_non_negative("bottom_line_coef", self.bottom_line_coef)?;
        check_non_negative("human_padding", self.human_padding)?;
        check_non_negative("rewind_secs", self.rewind_secs)?;
        if !(0.0..=1.0).contains(&self.initial_threshold) {
            return Err(MediaError::config(format!(
                "initial_threshold must be in [0, 1], got {}",
                self.initial_threshold
            )));
        }
        self.presence.validate()
    }

    /// Load from `SYNOPSIS_NAIVE_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            period: env_or("SYNOPSIS_NAIVE_PERIOD", defaults.period),
            bottom_line_coef: env_or("SYNOPSIS_NAIVE_BOTTOM_LINE_COEF", defaults.bottom_line_coef),
            secs_between_keyframes: env_or(
                "SYNOPSIS_NAIVE_SECS_BETWEEN_KEYFRAMES",
                defaults.secs_between_keyframes,
            ),
            initial_threshold: env_or(
                "SYNOPSIS_NAIVE_INITIAL_THRESHOLD",
                defaults.initial_threshold,
            ),
            threshold_step: env_or("SYNOPSIS_NAIVE_THRESHOLD_STEP", defaults.threshold_step),
            max_keyframes_per_min: env_or(
                "SYNOPSIS_NAIVE_MAX_KEYFRAMES_PER_MIN",
                defaults.max_keyframes_per_min,
            ),
            human_padding: env_or("SYNOPSIS_NAIVE_HUMAN_PADDING", defaults.human_padding),
            rewind_secs: env_or("SYNOPSIS_NAIVE_REWIND_SECS", defaults.rewind_secs),
            presence: presence_from_env("SYNOPSIS_NAIVE"),
        }
    }
}

/// Configuration for the histogram scene-cut strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub period: usize,
    /// Chi-squared distance above which consecutive samples are a cut
    pub threshold: f64,
    /// Minimum samples between two accepted cuts
    pub min_scene_frames: usize,
    /// Histogram bins per HSV channel
    pub histogram_bins: usize,
    pub rewind_secs: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            period: 3,
            threshold: 0.5,
            min_scene_frames: 5,
            histogram_bins: 8,
            rewind_secs: 1.0,
        }
    }
}

impl SceneConfig {
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_scene_frames(mut self, frames: usize) -> Self {
        self.min_scene_frames = frames;
        self
    }

    pub fn with_rewind_secs(mut self, secs: f64) -> Self {
        self.rewind_secs = secs;
        self
    }

    pub fn validate(&self) -> MediaResult<()> {
        check_period(self.period)?;
        check_positive("threshold", self.threshold)?;
        check_non_negative("rewind_secs", self.rewind_secs)?;
        if self.histogram_bins == 0 || self.histogram_bins > 64 {
            return Err(MediaError::config(format!(
                "histogram_bins must be in 1..=64, got {}",
                self.histogram_bins
            )));
        }
        Ok(())
    }

    /// Load from `SYNOPSIS_SCENE_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            period: env_or("SYNOPSIS_SCENE_PERIOD", defaults.period),
            threshold: env_or("SYNOPSIS_SCENE_THRESHOLD", defaults.threshold),
            min_scene_frames: env_or("SYNOPSIS_SCENE_MIN_SCENE_FRAMES", defaults.min_scene_frames),
            histogram_bins: env_or("SYNOPSIS_SCENE_HISTOGRAM_BINS", defaults.histogram_bins),
            rewind_secs: env_or("SYNOPSIS_SCENE_REWIND_SECS", defaults.rewind_secs),
        }
    }
}

/// Strategy selection plus its tuning, e.g. `{"strategy": "cells", "period": 3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    Cells(CellsConfig),
    Naive(NaiveConfig),
    Scene(SceneConfig),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Cells(CellsConfig::default())
    }
}

impl StrategyConfig {
    /// Default configuration for a strategy kind.
    pub fn for_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Cells => Self::Cells(CellsConfig::default()),
            StrategyKind::Naive => Self::Naive(NaiveConfig::default()),
            StrategyKind::Scene => Self::Scene(SceneConfig::default()),
        }
    }

    /// Environment-derived configuration for a strategy kind.
    pub fn from_env(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Cells => Self::Cells(CellsConfig::from_env()),
            StrategyKind::Naive => Self::Naive(NaiveConfig::from_env()),
            StrategyKind::Scene => Self::Scene(SceneConfig::from_env()),
        }
    }

    /// Parse from JSON.
    pub fn from_json(content: &str) -> MediaResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| MediaError::config(format!("Invalid strategy configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Cells(_) => StrategyKind::Cells,
            Self::Naive(_) => StrategyKind::Naive,
            Self::Scene(_) => StrategyKind::Scene,
        }
    }

    /// Sampling period of the configured strategy.
    pub fn sampling_period(&self) -> usize {
        match self {
            Self::Cells(c) => c.period,
            Self::Naive(c) => c.period,
            Self::Scene(c) => c.period,
        }
    }

    /// Seconds subtracted from each keyframe's raw frame.
    pub fn rewind_secs(&self) -> f64 {
        match self {
            Self::Cells(c) => c.rewind_secs,
            Self::Naive(c) => c.rewind_secs,
            Self::Scene(c) => c.rewind_secs,
        }
    }

    pub fn validate(&self) -> MediaResult<()> {
        match self {
            Self::Cells(c) => c.validate(),
            Self::Naive(c) => c.validate(),
            Self::Scene(c) => c.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        for kind in StrategyKind::ALL {
            assert!(StrategyConfig::for_kind(*kind).validate().is_ok());
        }
        let cells = CellsConfig::default();
        assert_eq!((cells.grid_cols, cells.grid_rows), (16, 9));
        assert_eq!(cells.period, 3);
        assert_eq!(NaiveConfig::default().rewind_secs, 1.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CellsConfig::default().with_period(0).validate().is_err());
        assert!(CellsConfig::default().with_grid(0, 9).validate().is_err());
        assert!(CellsConfig::default().with_resize_coef(1.5).validate().is_err());
        assert!(CellsConfig::default().with_resize_coef(0.0).validate().is_err());
        assert!(NaiveConfig::default()
            .with_secs_between_keyframes(0.0)
            .validate()
            .is_err());
        assert!(SceneConfig::default().with_threshold(-1.0).validate().is_err());
    }

    #[test]
    fn test_tagged_json() {
        let config = StrategyConfig::from_json(r#"{"strategy": "naive", "period": 5}"#).unwrap();
        assert_eq!(config.kind(), StrategyKind::Naive);
        assert_eq!(config.sampling_period(), 5);
        assert_eq!(config.rewind_secs(), 1.0);

        let json = serde_json::to_value(StrategyConfig::default()).unwrap();
        assert_eq!(json["strategy"], "cells");
        assert_eq!(json["grid_cols"], 16);

        assert!(StrategyConfig::from_json(r#"{"strategy": "cells", "period": 0}"#).is_err());
        assert!(StrategyConfig::from_json(r#"{"strategy": "unknown"}"#).is_err());
    }

    #[test]
    fn test_from_env_falls_back_to_defaults() {
        std::env::set_var("SYNOPSIS_SCENE_THRESHOLD", "not-a-number");
        std::env::set_var("SYNOPSIS_SCENE_MIN_SCENE_FRAMES", "9");
        let config = SceneConfig::from_env();
        std::env::remove_var("SYNOPSIS_SCENE_THRESHOLD");
        std::env::remove_var("SYNOPSIS_SCENE_MIN_SCENE_FRAMES");
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.min_scene_frames, 9);
    }
}
