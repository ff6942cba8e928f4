//! Synopsis keyframe detection binary.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use synopsis_cli::commands::{detect, evaluate};
use synopsis_cli::{CliConfig, DetectArgs, EvaluateArgs};

#[derive(Parser, Debug)]
#[command(name = "synopsis")]
#[command(about = "Keyframe detection for lecture videos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect keyframes in one video or image directory
    Detect(DetectArgs),
    /// Score strategies against an annotated dataset
    Evaluate(EvaluateArgs),
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("synopsis=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let config = CliConfig::from_env();
    info!(config = ?config, "Starting synopsis");

    match cli.command {
        Command::Detect(args) => {
            let input = args.input.clone();
            tokio::task::spawn_blocking(move || detect::run(args, &config))
                .await
                .context("Detection task panicked")?
                .with_context(|| format!("Keyframe detection failed for {}", input.display()))?;
        }
        Command::Evaluate(args) => {
            let dataset = args.dataset.clone();
            evaluate::run(args, &config)
                .await
                .with_context(|| format!("Evaluation failed for {}", dataset.display()))?;
        }
    }
    Ok(())
}
