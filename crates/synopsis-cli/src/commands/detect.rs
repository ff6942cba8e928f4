//! `synopsis detect`: keyframes for a single video.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use synopsis_media::{merge_content, open_source, KeyframeDetector, LocalImageSink};
use synopsis_models::{format_seconds, ContentItem, Keyframe, SavedKeyframe, StrategyKind};

use super::{build_human_detector, load_strategy_config, load_transcript};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::logging::RunLogger;

/// Arguments of `synopsis detect`.
#[derive(Debug, Clone, Args)]
pub struct DetectArgs {
    /// Video file or directory of frame images
    pub input: PathBuf,

    /// Keyframe strategy (cells, naive, scene)
    #[arg(long)]
    pub strategy: Option<StrategyKind>,

    /// Strategy configuration JSON
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Precomputed presenter regions (JSON, one entry per sampled frame)
    #[arg(long, conflicts_with = "cascade")]
    pub humans: Option<PathBuf>,

    /// Haar cascade XML for presenter detection
    #[arg(long)]
    pub cascade: Option<PathBuf>,

    /// Playback rate for image directories
    #[arg(long)]
    pub image_fps: Option<f64>,

    /// Save PNG keyframes and keyframes.json here instead of printing
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Transcript (JSON or SRT) to merge into content.json
    #[arg(long, requires = "output")]
    pub transcript: Option<PathBuf>,
}

/// Contents of `keyframes.json`, or of stdout without `--output`.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutput {
    pub run_id: String,
    pub video: String,
    pub strategy: StrategyKind,
    pub keyframes: Vec<Keyframe>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub saved: Vec<SavedKeyframe>,
}

/// Run detection for one input.
pub fn run(args: DetectArgs, config: &CliConfig) -> CliResult<DetectionOutput> {
    let strategy_config = load_strategy_config(args.config.as_deref(), args.strategy)?;
    let video = args.input.display().to_string();
    let logger = RunLogger::new(strategy_config.kind(), &video);
    let _span = logger.create_span().entered();
    logger.log_start("opening input");

    let source = open_source(&args.input, args.image_fps.unwrap_or(config.image_fps))?;
    let cascade = args.cascade.as_deref().or(config.cascade_path.as_deref());
    let humans = build_human_detector(args.humans.as_deref(), cascade)?;
    let mut detector = KeyframeDetector::new(source, humans, strategy_config)?;

    let keyframes = detector.detect()?;
    logger.log_progress(&format!("{} keyframes detected", keyframes.len()));

    let mut output = DetectionOutput {
        run_id: logger.run_id().to_string(),
        video,
        strategy: detector.strategy_kind(),
        keyframes,
        saved: Vec::new(),
    };

    let Some(dir) = args.output.as_deref() else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &output)?;
        writeln!(handle)?;
        logger.log_completion("keyframes written to stdout");
        return Ok(output);
    };

    let mut sink = LocalImageSink::new(dir)?;
    output.saved = detector.save_keyframes(&output.keyframes, &mut sink)?;
    write_json(&dir.join("keyframes.json"), &output)?;

    if let Some(path) = args.transcript.as_deref() {
        let transcript = load_transcript(path)?;
        if transcript.is_empty() {
            logger.log_warning("transcript is empty, content holds only images");
        }
        let content: Vec<ContentItem> = merge_content(&output.saved, &transcript);
        write_json(&dir.join("content.json"), &content)?;
        logger.log_progress(&format!("{} content items merged", content.len()));
    }

    let span = output
        .saved
        .last()
        .map(|k| format_seconds(k.timestamp))
        .unwrap_or_else(|| format_seconds(0.0));
    logger.log_completion(&format!(
        "{} keyframes saved to {} (last at {})",
        output.saved.len(),
        dir.display(),
        span
    ));
    Ok(output)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> CliResult<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;
    Ok(())
}
