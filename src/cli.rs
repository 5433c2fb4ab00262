use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mediaforge::common::error::ConvertError;
use mediaforge::modules::conversion::dto::{ConversionRequest, mode_from_fields};
use mediaforge::pipeline::acquire::InputSource;

#[derive(Parser)]
#[command(name = "mediaforge")]
#[command(author, version, about = "Convert media into MP3 or MP4 variants using ffmpeg")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        /// Host to bind to (overrides APP_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides APP_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create MP3 variants
    Mp3 {
        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated list of MP3 bitrates (e.g. 128k,192k,320k)
        #[arg(long)]
        bitrates: Option<String>,
    },

    /// Create MP4 variants
    Mp4 {
        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated list of resolutions in WIDTH:HEIGHT format
        #[arg(long)]
        resolutions: Option<String>,

        /// Target video bitrate (e.g. 2500k)
        #[arg(long)]
        video_bitrate: Option<String>,

        /// Target audio bitrate (e.g. 128k)
        #[arg(long)]
        audio_bitrate: Option<String>,
    },

    /// List the files a job produced
    Outputs {
        /// Job ID printed by a previous conversion
        job_id: String,
    },

    /// Check that ffmpeg and yt-dlp are available
    CheckTools,
}

#[derive(Args)]
pub struct SourceArgs {
    /// Path to the source media file
    #[arg(conflicts_with = "url")]
    pub input: Option<PathBuf>,

    /// Fetch the source from a video URL instead of a local file
    #[arg(long)]
    pub url: Option<String>,

    /// Directory where converted files will be stored
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,
}

impl SourceArgs {
    fn input_source(self) -> Result<(InputSource, PathBuf), ConvertError> {
        let source = match (self.input, self.url) {
            (Some(path), _) => InputSource::Local(path),
            (None, Some(url)) => InputSource::Remote(url),
            (None, None) => return Err(ConvertError::MissingInput),
        };
        Ok((source, self.output_dir))
    }
}

/// A conversion request built from `mp3`/`mp4` arguments, plus its target directory.
pub fn conversion_request(command: Commands) -> Option<Result<(ConversionRequest, PathBuf), ConvertError>> {
    let (source, mode) = match command {
        Commands::Mp3 { source, bitrates } => {
            (source, mode_from_fields(Some("mp3"), bitrates.as_deref(), None, None, None))
        }
        Commands::Mp4 {
            source,
            resolutions,
            video_bitrate,
            audio_bitrate,
        } => (
            source,
            mode_from_fields(Some("mp4"), None, resolutions.as_deref(), video_bitrate, audio_bitrate),
        ),
        _ => return None,
    };

    Some(
        source
            .input_source()
            .map(|(source, output_dir)| (ConversionRequest { source, mode }, output_dir)),
    )
}
