//! Shared data models for the Synopsis keyframe engine.
//!
//! This crate provides Serde-serializable types for:
//! - Typed frame positions (sampled index vs. raw frame number)
//! - Keyframes and saved keyframe references
//! - Time-coded transcripts and merged content items
//! - Keyframe strategy selection
//! - Evaluation statistics against annotated datasets

pub mod content;
pub mod evaluation;
pub mod frame_index;
pub mod keyframe;
pub mod strategy;
pub mod timestamp;
pub mod transcript;

// Re-export common types
pub use content::{ContentItem, ContentType};
pub use evaluation::{
    evaluate, AnnotatedInterval, DatasetManifest, DatasetVideo, EvaluationReport,
    EvaluationStats, StrategyEvaluation, VideoEvaluation,
};
pub use frame_index::{RawFrameNumber, SampledIndex};
pub use keyframe::{Keyframe, SavedKeyframe};
pub use strategy::{StrategyKind, StrategyKindParseError};
pub use timestamp::{format_seconds, parse_srt_timecode, TimestampError};
pub use transcript::{parse_srt, TranscriptError, TranscriptSegment};
