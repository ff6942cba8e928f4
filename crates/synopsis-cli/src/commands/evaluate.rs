//! `synopsis evaluate`: score strategies against an annotated dataset.
//!
//! Videos are evaluated concurrently, each on its own blocking task with its
//! own cursor. A semaphore bounds how many decode at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use synopsis_media::{open_source, KeyframeDetector, LocalImageSink, StrategyConfig};
use synopsis_models::{
    evaluate, DatasetManifest, DatasetVideo, EvaluationReport, StrategyEvaluation, StrategyKind,
    VideoEvaluation,
};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use super::build_human_detector;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::logging::RunLogger;

/// Arguments of `synopsis evaluate`.
#[derive(Debug, Clone, Args)]
pub struct EvaluateArgs {
    /// Dataset directory containing data.json and the videos
    pub dataset: PathBuf,

    /// Strategy to evaluate (repeatable; defaults to cells and naive)
    #[arg(long = "strategy")]
    pub strategies: Vec<StrategyKind>,

    /// Directory for result.json and saved keyframes
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save keyframe images under <output>/<strategy>/<video>.out/
    #[arg(long)]
    pub save_keyframes: bool,

    /// Maximum videos evaluated at once
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Playback rate for image directories
    #[arg(long)]
    pub image_fps: Option<f64>,
}

/// Everything a worker needs to evaluate one video.
#[derive(Debug, Clone)]
struct VideoJob {
    run_id: String,
    dataset: PathBuf,
    video: DatasetVideo,
    strategies: Vec<StrategyKind>,
    image_fps: f64,
    cascade: Option<PathBuf>,
    keyframe_dir: Option<PathBuf>,
}

/// Evaluate every video in the dataset and write `result.json`.
pub async fn run(args: EvaluateArgs, config: &CliConfig) -> CliResult<EvaluationReport> {
    let manifest = load_manifest(&args.dataset)?;
    let strategies = if args.strategies.is_empty() {
        vec![StrategyKind::Cells, StrategyKind::Naive]
    } else {
        args.strategies.clone()
    };
    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&output_dir)?;

    let max_concurrent = args.max_concurrent.unwrap_or(config.max_concurrent).max(1);
    let run_id = Uuid::new_v4().to_string();
    info!(
        run_id = %run_id,
        dataset = %args.dataset.display(),
        videos = manifest.videos.len(),
        strategies = ?strategies,
        max_concurrent,
        "Starting evaluation"
    );

    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let mut handles = Vec::with_capacity(manifest.videos.len());
    for video in manifest.videos {
        let job = VideoJob {
            run_id: run_id.clone(),
            dataset: args.dataset.clone(),
            video,
            strategies: strategies.clone(),
            image_fps: args.image_fps.unwrap_or(config.image_fps),
            cascade: config.cascade_path.clone(),
            keyframe_dir: args.save_keyframes.then(|| output_dir.clone()),
        };
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| CliError::task_failed(e.to_string()))?;
            tokio::task::spawn_blocking(move || evaluate_video(job))
                .await
                .map_err(|e| CliError::task_failed(e.to_string()))?
        }));
    }

    let mut videos = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(Ok(evaluation)) => videos.push(evaluation),
            Ok(Err(e)) => warn!(run_id = %run_id, error = %e, "Video evaluation failed"),
            Err(e) => warn!(run_id = %run_id, error = %e, "Video evaluation task panicked"),
        }
    }

    let report = EvaluationReport {
        run_id,
        generated_at: chrono::Utc::now().to_rfc3339(),
        videos,
    };
    for &strategy in &strategies {
        if let Some(recall) = report.mean_recall(strategy) {
            info!(strategy = %strategy, mean_recall = recall, "Strategy summary");
        }
    }

    let result_path = output_dir.join("result.json");
    let file = std::fs::File::create(&result_path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &report)?;
    info!(
        path = %result_path.display(),
        videos = report.videos.len(),
        "Evaluation report written"
    );
    Ok(report)
}

fn load_manifest(dataset: &Path) -> CliResult<DatasetManifest> {
    let path = dataset.join("data.json");
    if !path.is_file() {
        return Err(CliError::dataset(format!("{} not found", path.display())));
    }
    let manifest: DatasetManifest = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    if manifest.videos.is_empty() {
        warn!(path = %path.display(), "Dataset lists no videos");
    }
    Ok(manifest)
}

/// Run every strategy on one video. Blocking.
fn evaluate_video(job: VideoJob) -> CliResult<VideoEvaluation> {
    let path = job.dataset.join(&job.video.name);
    let mut stats_by_strategy = Vec::with_capacity(job.strategies.len());

    for &strategy in &job.strategies {
        let logger = RunLogger::with_run_id(&job.run_id, strategy, &job.video.name);
        let _span = logger.create_span().entered();
        logger.log_start("evaluating");

        let evaluation = evaluate_strategy(&job, &path, strategy, &logger).map_err(|e| {
            logger.log_error(&e.to_string());
            e
        })?;
        stats_by_strategy.push(evaluation);
    }

    Ok(VideoEvaluation {
        name: job.video.name,
        intervals: job.video.intervals,
        stats_by_strategy,
    })
}

fn evaluate_strategy(
    job: &VideoJob,
    path: &Path,
    strategy: StrategyKind,
    logger: &RunLogger,
) -> CliResult<StrategyEvaluation> {
    let source = open_source(path, job.image_fps)?;
    let cascade = job.cascade.as_deref().filter(|_| strategy.uses_humans());
    let humans = build_human_detector(None, cascade)?;
    let config = StrategyConfig::from_env(strategy);
    let mut detector = KeyframeDetector::new(source, humans, config)?;
    let keyframes = detector.detect()?;

    if let Some(dir) = &job.keyframe_dir {
        let out = dir
            .join(strategy.as_str())
            .join(format!("{}.out", job.video.name));
        let mut sink = LocalImageSink::new(&out)?;
        detector.save_keyframes(&keyframes, &mut sink)?;
    }

    let frames: Vec<u64> = keyframes.iter().map(|k| k.frame.get()).collect();
    let stats = evaluate(&job.video.intervals, &frames);
    logger.log_completion(&format!(
        "precision={:.3} recall={:.3} missing={} extra={}",
        stats.precision, stats.recall, stats.n_missing, stats.n_extra
    ));
    Ok(StrategyEvaluation {
        strategy,
        keyframes: frames,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_dataset(root: &Path) {
        let frames = root.join("lecture");
        std::fs::create_dir_all(&frames).unwrap();
        for i in 0..12 {
            RgbImage::from_pixel(16, 12, Rgb([90, 90, 90]))
                .save(frames.join(format!("{:03}.png", i)))
                .unwrap();
        }
        std::fs::write(
            root.join("data.json"),
            r#"{"videos": [
                {"name": "lecture", "intervals": [{"start": 0, "end": 11}]},
                {"name": "missing", "intervals": []}
            ]}"#,
        )
        .unwrap();
    }

    fn config(output: &Path) -> CliConfig {
        CliConfig {
            output_dir: output.to_path_buf(),
            image_fps: 2.0,
            max_concurrent: 2,
            cascade_path: None,
        }
    }

    #[test]
    fn test_evaluate_dataset() {
        let dataset = tempfile::tempdir().unwrap();
        write_dataset(dataset.path());
        let output = tempfile::tempdir().unwrap();

        let args = EvaluateArgs {
            dataset: dataset.path().to_path_buf(),
            strategies: vec![StrategyKind::Scene],
            output: None,
            save_keyframes: true,
            max_concurrent: None,
            image_fps: None,
        };
        let report = tokio_test::block_on(run(args, &config(output.path()))).unwrap();

        // The unreadable video is skipped, not fatal.
        assert_eq!(report.videos.len(), 1);
        let evaluation = &report.videos[0].stats_by_strategy[0];
        assert_eq!(evaluation.strategy, StrategyKind::Scene);
        // Last sample (raw 11) rewound by one second at 2 fps.
        assert_eq!(evaluation.keyframes, vec![9]);
        assert_eq!(evaluation.stats.recall, 1.0);
        assert_eq!(evaluation.stats.precision, 1.0);

        assert!(output.path().join("result.json").is_file());
        assert!(output
            .path()
            .join("scene")
            .join("lecture.out")
            .join("9.png")
            .is_file());
    }

    #[test]
    fn test_missing_manifest() {
        let dataset = tempfile::tempdir().unwrap();
        let err = load_manifest(dataset.path()).unwrap_err();
        assert!(matches!(err, CliError::Dataset(_)));
    }

    #[test]
    fn test_unreadable_video_fails_its_job() {
        let dataset = tempfile::tempdir().unwrap();
        let job = VideoJob {
            run_id: "run-1".to_string(),
            dataset: dataset.path().to_path_buf(),
            video: DatasetVideo {
                name: "absent".to_string(),
                intervals: vec![],
            },
            strategies: vec![StrategyKind::Naive],
            image_fps: 2.0,
            cascade: None,
            keyframe_dir: None,
        };
        assert!(evaluate_video(job).is_err());
    }
}
