//! Keyframe detection orchestrator.
//!
//! Owns the frame cursor, the human detector and the strategy for one video,
//! and extracts the chosen frames into an [`ImageSink`].

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat};
use synopsis_models::{Keyframe, SavedKeyframe, StrategyKind};
use tracing::{debug, info};

use crate::error::MediaResult;
use crate::frame::VideoProperties;
use crate::human::HumanDetector;
use crate::keyframes::{KeyframeStrategy, StrategyBuilder, StrategyConfig};
use crate::sink::ImageSink;
use crate::source::{FrameCursor, FrameSource};

/// Detects keyframes in one video.
pub struct KeyframeDetector {
    cursor: FrameCursor,
    humans: Box<dyn HumanDetector>,
    strategy: Box<dyn KeyframeStrategy>,
}

impl KeyframeDetector {
    /// Build a detector for `source` with the configured strategy.
    pub fn new<S: FrameSource + 'static>(
        source: S,
        humans: Box<dyn HumanDetector>,
        config: StrategyConfig,
    ) -> MediaResult<Self> {
        let strategy = StrategyBuilder::for_config(config).build()?;
        Self::with_strategy(source, humans, strategy)
    }

    /// Build a detector around an existing strategy.
    pub fn with_strategy<S: FrameSource + 'static>(
        source: S,
        humans: Box<dyn HumanDetector>,
        strategy: Box<dyn KeyframeStrategy>,
    ) -> MediaResult<Self> {
        let cursor = FrameCursor::new(source, strategy.sampling_period())?;
        Ok(Self {
            cursor,
            humans,
            strategy,
        })
    }

    pub fn properties(&self) -> VideoProperties {
        self.cursor.properties()
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Run the strategy over the whole video.
    pub fn detect(&mut self) -> MediaResult<Vec<Keyframe>> {
        let props = self.cursor.properties();
        info!(
            strategy = self.strategy.kind().as_str(),
            detector = self.humans.name(),
            width = props.width,
            height = props.height,
            fps = props.fps,
            frames = props.frame_count,
            "Detecting keyframes"
        );
        let keyframes = self
            .strategy
            .detect_keyframes(&mut self.cursor, self.humans.as_mut())?;
        info!(
            keyframes = keyframes.len(),
            rewinds = self.cursor.rewinds(),
            "Keyframe detection complete"
        );
        Ok(keyframes)
    }

    /// Encode each keyframe as PNG and hand it to `sink`.
    ///
    /// Frames are read in ascending raw order; results follow that order.
    pub fn save_keyframes(
        &mut self,
        keyframes: &[Keyframe],
        sink: &mut dyn ImageSink,
    ) -> MediaResult<Vec<SavedKeyframe>> {
        let mut ordered = keyframes.to_vec();
        ordered.sort_by_key(|k| k.frame);

        let mut saved = Vec::with_capacity(ordered.len());
        for keyframe in ordered {
            let image = self.cursor.raw_frame_at(keyframe.frame)?;
            let mut bytes = Vec::new();
            DynamicImage::ImageRgb8(image)
                .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
            let reference = sink.save(&bytes, keyframe.frame)?;
            debug!(frame = %keyframe.frame, reference = %reference, "Keyframe saved");
            saved.push(SavedKeyframe::new(reference, keyframe.timestamp));
        }
        Ok(saved)
    }
}
