//! Lecture video keyframe detection.
//!
//! This crate provides:
//! - Frame sources (FFmpeg pipe, image sequences, in-memory, optional OpenCV)
//!   behind a forward-only sampling cursor
//! - Presenter detection and presence classification
//! - Three keyframe strategies: cell grid, naive whole-frame and scene cuts
//! - Keyframe extraction into image sinks and transcript merging

pub mod content;
pub mod detector;
pub mod error;
pub mod frame;
pub mod human;
pub mod keyframes;
pub mod probe;
pub mod sink;
pub mod source;
pub mod stats;

pub use content::merge_content;
pub use detector::KeyframeDetector;
pub use error::{MediaError, MediaResult};
pub use frame::{Frame, VideoProperties};
pub use human::{
    detect_all, HumanDetector, HumanPresenceConfig, HumanRegion, NoHumanDetector,
    PrecomputedHumans, Presence,
};
#[cfg(feature = "opencv")]
pub use human::HaarCascadeDetector;
pub use keyframes::{
    CellsConfig, CellsStrategy, KeyframeStrategy, NaiveConfig, NaiveStrategy, SceneConfig,
    SceneStrategy, StrategyBuilder, StrategyConfig,
};
pub use probe::{probe_video, VideoInfo};
pub use sink::{ImageSink, LocalImageSink, MemoryImageSink};
pub use source::{
    open_source, FfmpegFrameSource, FrameCursor, FrameSource, ImageSequenceSource,
    MemoryFrameSource,
};
#[cfg(feature = "opencv")]
pub use source::OpenCvFrameSource;
