//! Structured run logging.
//!
//! Every detection run gets a run id so that interleaved log lines from
//! concurrent evaluations can be told apart.

use synopsis_models::StrategyKind;
use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Logger for one strategy run over one video.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    strategy: StrategyKind,
    video: String,
}

impl RunLogger {
    /// Create a logger with a fresh run id.
    pub fn new(strategy: StrategyKind, video: &str) -> Self {
        Self::with_run_id(&Uuid::new_v4().to_string(), strategy, video)
    }

    /// Create a logger sharing an existing run id.
    pub fn with_run_id(run_id: &str, strategy: StrategyKind, video: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            strategy,
            video: video.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            strategy = %self.strategy,
            video = %self.video,
            "Run started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            strategy = %self.strategy,
            video = %self.video,
            "Run progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            strategy = %self.strategy,
            video = %self.video,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            strategy = %self.strategy,
            video = %self.video,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            strategy = %self.strategy,
            video = %self.video,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn video(&self) -> &str {
        &self.video
    }

    /// Tracing span carrying the run context.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            strategy = %self.strategy,
            video = %self.video
        )
    }
}
