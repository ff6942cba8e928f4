//! CLI configuration.

use std::path::PathBuf;

/// Settings not covered by the strategy configs.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Default output directory for evaluation runs
    pub output_dir: PathBuf,
    /// Playback rate assumed for image-sequence directories
    pub image_fps: f64,
    /// Maximum videos evaluated at once
    pub max_concurrent: usize,
    /// Haar cascade used when no precomputed humans are given
    pub cascade_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("synopsis-out"),
            image_fps: 25.0,
            max_concurrent: 2,
            cascade_path: None,
        }
    }
}

impl CliConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            output_dir: std::env::var("SYNOPSIS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            image_fps: std::env::var("SYNOPSIS_IMAGE_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|fps: &f64| *fps > 0.0)
                .unwrap_or(defaults.image_fps),
            max_concurrent: std::env::var("SYNOPSIS_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent),
            cascade_path: std::env::var("SYNOPSIS_CASCADE_PATH").ok().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_falls_back_on_garbage() {
        std::env::set_var("SYNOPSIS_MAX_CONCURRENT", "0");
        std::env::set_var("SYNOPSIS_IMAGE_FPS", "fast");
        std::env::set_var("SYNOPSIS_OUTPUT_DIR", "/tmp/synopsis-test");

        let config = CliConfig::from_env();
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.image_fps, 25.0);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/synopsis-test"));

        std::env::remove_var("SYNOPSIS_MAX_CONCURRENT");
        std::env::remove_var("SYNOPSIS_IMAGE_FPS");
        std::env::remove_var("SYNOPSIS_OUTPUT_DIR");
    }
}
