//! Command line front end for the Synopsis keyframe engine.
//!
//! This crate provides:
//! - Environment configuration and structured run logging
//! - `detect`: keyframes, saved images and merged content for one video
//! - `evaluate`: concurrent scoring of strategies against annotated datasets

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use commands::detect::{DetectArgs, DetectionOutput};
pub use commands::evaluate::EvaluateArgs;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
pub use logging::RunLogger;
