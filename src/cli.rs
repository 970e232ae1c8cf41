use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate source and translated subtitles for a video
    Process {
        /// Input video file or http(s) URL
        #[arg(short, long)]
        input: String,

        /// Speech recognition language code
        #[arg(short, long, default_value = "de_DE")]
        language_code: String,

        /// Source language for translation
        #[arg(short, long, default_value = "de")]
        source_lang: String,

        /// Target language for translation
        #[arg(short, long, default_value = "en")]
        target_lang: String,

        /// Output directory for subtitle files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Use a saved recognize response instead of running the recognizer
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Use a prepared translation instead of translating with Ollama
        #[arg(long)]
        translation: Option<PathBuf>,
    },

    /// Segment a saved recognize response into subtitles
    Segment {
        /// Recognize response JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace subtitle text with translated lines
    Update {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Translated text, one line per cue
        #[arg(short, long)]
        translation: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export subtitle text, one line per cue
    ExportText {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output text file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the default configuration
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "subgen.toml")]
        output: PathBuf,
    },
}
