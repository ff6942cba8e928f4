//! Keyframe detection strategies.
//!
//! Three interchangeable strategies share the [`KeyframeStrategy`] contract:
//! - `CellsStrategy` - cell grid differencing with human-presence segmentation
//! - `NaiveStrategy` - whole-frame differencing with an adaptive threshold
//! - `SceneStrategy` - HSV histogram scene cuts
//!
//! Strategies are selected by [`StrategyConfig`] through [`StrategyBuilder`].

mod calibration;
mod cells;
mod config;
mod grid;
mod joints;
mod naive;
mod peaks;
mod postprocess;
mod scene;
mod segmenter;

pub use calibration::{changed_cells, Calibration};
pub use cells::{CellsAnalysis, CellsStrategy, SegmentAnalysis};
pub use config::{CellsConfig, NaiveConfig, SceneConfig, StrategyConfig};
pub use grid::{Cell, CellAnalyzer, CellDiffMatrix, CellGrid};
pub use joints::{find_joint_peaks, joint_calibration};
pub use naive::{masked_frame_diff, NaiveStrategy};
pub use peaks::{detect_peaks, local_maxima, normalized_threshold, push_terminal, suppress_close};
pub use postprocess::{back_off_in_segment, dedup_segment_peaks, global_sweep};
pub use scene::{chi_squared_distance, SceneStrategy};
pub use segmenter::{build_segments, Segment, SegmentKind};

use synopsis_models::{Keyframe, SampledIndex, StrategyKind};
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::human::HumanDetector;
use crate::source::FrameCursor;

/// Keyframe detection strategy.
pub trait KeyframeStrategy: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Sampling period the cursor must use.
    fn sampling_period(&self) -> usize;

    /// Detect keyframes over the whole stream.
    ///
    /// Returns keyframes in ascending order. The cursor may be rewound any
    /// number of times and is left at an arbitrary position.
    fn detect_keyframes(
        &self,
        cursor: &mut FrameCursor,
        detector: &mut dyn HumanDetector,
    ) -> MediaResult<Vec<Keyframe>>;
}

/// Builder for creating strategies from configuration.
///
/// # Example
///
/// ```ignore
/// let strategy = StrategyBuilder::for_config(StrategyConfig::default()).build()?;
/// let keyframes = strategy.detect_keyframes(&mut cursor, &mut detector)?;
/// ```
pub struct StrategyBuilder {
    config: StrategyConfig,
}

impl StrategyBuilder {
    pub fn for_config(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// Builder for a strategy kind with default tuning.
    pub fn for_kind(kind: StrategyKind) -> Self {
        Self::for_config(StrategyConfig::for_kind(kind))
    }

    /// Build the strategy, validating its configuration.
    pub fn build(self) -> MediaResult<Box<dyn KeyframeStrategy>> {
        let kind = self.config.kind();
        info!(strategy = kind.as_str(), "Building keyframe strategy");
        let strategy: Box<dyn KeyframeStrategy> = match self.config {
            StrategyConfig::Cells(config) => Box::new(CellsStrategy::new(config)?),
            StrategyConfig::Naive(config) => Box::new(NaiveStrategy::new(config)?),
            StrategyConfig::Scene(config) => Box::new(SceneStrategy::new(config)?),
        };
        Ok(strategy)
    }
}

pub(crate) fn check_period(cursor: &FrameCursor, period: usize) -> MediaResult<()> {
    if cursor.period() != period {
        return Err(MediaError::config(format!(
            "Cursor samples every {} frames but the strategy expects {}",
            cursor.period(),
            period
        )));
    }
    Ok(())
}

/// Convert ascending sampled peaks into keyframes.
///
/// The rewind saturates at frame zero, so early peaks can land on the same raw
/// frame. Only the first keyframe per raw frame is kept.
pub(crate) fn keyframes_from_peaks(
    peaks: impl IntoIterator<Item = SampledIndex>,
    period: usize,
    rewind_frames: u64,
    fps: f64,
) -> Vec<Keyframe> {
    let mut keyframes: Vec<Keyframe> = peaks
        .into_iter()
        .map(|index| Keyframe::from_sampled(index, period, rewind_frames, fps))
        .collect();
    let before = keyframes.len();
    keyframes.dedup_by_key(|k| k.frame);
    if keyframes.len() < before {
        debug!(
            collapsed = before - keyframes.len(),
            rewind_frames, "Dropped keyframes sharing a raw frame after rewind"
        );
    }
    keyframes
}
