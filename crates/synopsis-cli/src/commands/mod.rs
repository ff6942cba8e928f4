//! Subcommands and the input loading they share.

pub mod detect;
pub mod evaluate;

use std::path::Path;

use synopsis_media::{HumanDetector, NoHumanDetector, PrecomputedHumans, StrategyConfig};
use synopsis_models::transcript::parse_json;
use synopsis_models::{parse_srt, StrategyKind, TranscriptSegment};
use tracing::{info, warn};

use crate::error::CliResult;

/// Resolve the strategy configuration.
///
/// A config file wins over the environment. An explicit `kind` that differs
/// from the file's strategy replaces it with that kind's environment config.
pub fn load_strategy_config(
    config_path: Option<&Path>,
    kind: Option<StrategyKind>,
) -> CliResult<StrategyConfig> {
    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let config = StrategyConfig::from_json(&content)?;
            info!(path = %path.display(), strategy = %config.kind(), "Loaded strategy config");
            config
        }
        None => StrategyConfig::from_env(kind.unwrap_or_default()),
    };

    match kind {
        Some(kind) if kind != config.kind() => {
            warn!(
                file = %config.kind(),
                requested = %kind,
                "Strategy flag overrides config file, using environment tuning"
            );
            let config = StrategyConfig::from_env(kind);
            config.validate()?;
            Ok(config)
        }
        _ => {
            config.validate()?;
            Ok(config)
        }
    }
}

/// Build the presenter detector for one run.
///
/// Precomputed regions take precedence over a cascade; with neither, every
/// frame is treated as empty.
pub fn build_human_detector(
    humans: Option<&Path>,
    cascade: Option<&Path>,
) -> CliResult<Box<dyn HumanDetector>> {
    if let Some(path) = humans {
        return Ok(Box::new(PrecomputedHumans::load(path)?));
    }
    match cascade {
        Some(path) => cascade_detector(path),
        None => Ok(Box::new(NoHumanDetector)),
    }
}

#[cfg(feature = "opencv")]
fn cascade_detector(path: &Path) -> CliResult<Box<dyn HumanDetector>> {
    Ok(Box::new(synopsis_media::HaarCascadeDetector::new(path)?))
}

#[cfg(not(feature = "opencv"))]
fn cascade_detector(path: &Path) -> CliResult<Box<dyn HumanDetector>> {
    Err(crate::error::CliError::invalid_argument(format!(
        "Cascade {} requires a build with the opencv feature",
        path.display()
    )))
}

/// Load a transcript, as SubRip when the extension is `.srt` and JSON otherwise.
pub fn load_transcript(path: &Path) -> CliResult<Vec<TranscriptSegment>> {
    let content = std::fs::read_to_string(path)?;
    let is_srt = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("srt"))
        .unwrap_or(false);
    let segments = if is_srt {
        parse_srt(&content)?
    } else {
        parse_json(&content)?
    };
    info!(path = %path.display(), segments = segments.len(), "Loaded transcript");
    Ok(segments)
}
