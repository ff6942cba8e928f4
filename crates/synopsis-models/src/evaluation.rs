//! Keyframe evaluation against annotated datasets.
//!
//! A dataset directory contains `data.json`:
//!
//! ```json
//! {"videos": [{"name": "lecture.mp4", "intervals": [{"start": 120, "end": 300}]}]}
//! ```
//!
//! Each interval marks a span of raw frames in which a keyframe is expected.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// Span of raw frames (inclusive) expected to contain a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotatedInterval {
    pub start: u64,
    pub end: u64,
}

impl AnnotatedInterval {
    pub fn contains(&self, frame: u64) -> bool {
        self.start <= frame && frame <= self.end
    }
}

/// Quality of one keyframe set against its annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationStats {
    pub precision: f64,
    pub recall: f64,
    /// Intervals without any keyframe
    pub n_missing: usize,
    /// Keyframes not credited to an interval
    pub n_extra: usize,
}

/// Score keyframes (raw frame numbers) against annotated intervals.
///
/// An interval counts as found when at least one keyframe falls inside it.
pub fn evaluate(intervals: &[AnnotatedInterval], keyframes: &[u64]) -> EvaluationStats {
    let true_positives = intervals
        .iter()
        .filter(|interval| keyframes.iter().any(|&kf| interval.contains(kf)))
        .count();

    let precision = if keyframes.is_empty() {
        0.0
    } else {
        true_positives as f64 / keyframes.len() as f64
    };
    let recall = if intervals.is_empty() {
        1.0
    } else {
        true_positives as f64 / intervals.len() as f64
    };

    EvaluationStats {
        precision,
        recall,
        n_missing: intervals.len() - true_positives,
        n_extra: keyframes.len().saturating_sub(true_positives),
    }
}

/// Contents of a dataset's `data.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetManifest {
    pub videos: Vec<DatasetVideo>,
}

/// One annotated video, relative to the dataset directory.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetVideo {
    pub name: String,
    #[serde(default)]
    pub intervals: Vec<AnnotatedInterval>,
}

/// Result of one strategy on one video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StrategyEvaluation {
    pub strategy: StrategyKind,
    /// Raw frame numbers of the detected keyframes
    pub keyframes: Vec<u64>,
    pub stats: EvaluationStats,
}

/// Results for one video across strategies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoEvaluation {
    pub name: String,
    pub intervals: Vec<AnnotatedInterval>,
    pub stats_by_strategy: Vec<StrategyEvaluation>,
}

/// Full evaluation run written to `result.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationReport {
    pub run_id: String,
    /// RFC 3339 generation time
    pub generated_at: String,
    pub videos: Vec<VideoEvaluation>,
}

impl EvaluationReport {
    /// Mean recall of one strategy across all videos it ran on.
    pub fn mean_recall(&self, strategy: StrategyKind) -> Option<f64> {
        let recalls: Vec<f64> = self
            .videos
            .iter()
            .flat_map(|v| v.stats_by_strategy.iter())
            .filter(|s| s.strategy == strategy)
            .map(|s| s.stats.recall)
            .collect();
        if recalls.is_empty() {
            return None;
        }
        Some(recalls.iter().sum::<f64>() / recalls.len() as f64)
    }
}
