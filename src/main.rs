//! subgen - Translated subtitles from speech recognition
//!
//! Command line entry point: loads configuration, sets up logging and runs
//! the requested pipeline stage.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use subgen::cli::{Args, Commands};
use subgen::config::Config;
use subgen::translate::check_ollama_availability;
use subgen::workflow::{ProcessRequest, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("subgen.toml").exists() {
                info!("Found subgen.toml in current directory, loading...");
                Config::from_file("subgen.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Process {
            input,
            language_code,
            source_lang,
            target_lang,
            output_dir,
            transcript,
            translation,
        } => {
            info!("Processing video: {}", input);

            if translation.is_none() {
                check_ollama_availability(&config.translate.endpoint, &config.translate.model).await?;
            }

            let workflow = Workflow::from_config(config, transcript, translation)?;
            let request = ProcessRequest {
                input,
                language_code,
                source_language: source_lang,
                target_language: target_lang,
                output_dir,
            };
            let report = workflow.process_video(&request).await?;

            println!("Subtitles ({} cues):", report.cue_count);
            println!("  {} ({})", report.source_subtitles.display(), report.source_uri);
            println!("  {} ({})", report.target_subtitles.display(), report.target_uri);
            if report.update.kept_original > 0 || report.update.ignored_lines > 0 {
                println!(
                    "  {} cues kept their original text, {} translated lines ignored",
                    report.update.kept_original, report.update.ignored_lines
                );
            }
        }
        Commands::Segment { input, output } => {
            info!("Segmenting transcript: {}", input.display());
            let workflow = Workflow::from_config(config, None, None)?;
            let count = workflow.segment_transcript(&input, &output).await?;
            println!("Wrote {} cues to {}", count, output.display());
        }
        Commands::Update { input, translation, output } => {
            info!("Updating subtitles: {}", input.display());
            let workflow = Workflow::from_config(config, None, None)?;
            let summary = workflow.update_subtitles(&input, &translation, &output).await?;
            println!("Updated {} cues in {}", summary.updated, output.display());
        }
        Commands::ExportText { input, output } => {
            info!("Exporting subtitle text: {}", input.display());
            let workflow = Workflow::from_config(config, None, None)?;
            let count = workflow.export_text(&input, &output).await?;
            println!("Wrote {} lines to {}", count, output.display());
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from video: {}", input.display());
            let workflow = Workflow::from_config(config, None, None)?;
            workflow.extract_audio(&input, &output).await?;
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            println!("Wrote configuration to {}", output.display());
        }
    }

    info!("subgen completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subgen").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation
    let file_appender = rolling::daily(&log_dir, "subgen.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subgen.log").display());

    Ok(())
}
