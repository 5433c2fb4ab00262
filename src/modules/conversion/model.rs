use serde::Serialize;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use crate::infrastructure::storage::registry::JobId;

/// What a job produces. Exactly one mode applies per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionMode {
    /// One MP3 per bitrate. Empty list means the configured defaults.
    AudioBitrateSet { bitrates: Vec<String> },
    /// One MP4 per resolution, all sharing the same video/audio bitrate.
    VideoResolutionSet {
        resolutions: Vec<String>,
        video_bitrate: Option<String>,
        audio_bitrate: Option<String>,
    },
}

impl ConversionMode {
    pub fn format(&self) -> OutputFormat {
        match self {
            ConversionMode::AudioBitrateSet { .. } => OutputFormat::Mp3,
            ConversionMode::VideoResolutionSet { .. } => OutputFormat::Mp4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp3,
    Mp4,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Mp4 => "mp4",
        }
    }
}

/// Encoder parameters for a single variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    Audio {
        bitrate: String,
    },
    Video {
        resolution: String,
        video_bitrate: String,
        audio_bitrate: String,
    },
}

impl Encoding {
    /// The token that distinguishes this variant's output name.
    pub fn token(&self) -> &str {
        match self {
            Encoding::Audio { bitrate } => bitrate,
            Encoding::Video { resolution, .. } => resolution,
        }
    }
}

/// One planned output of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: Encoding,
}

impl VariantSpec {
    pub fn output_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A job after acquisition: where its input lives and where its outputs go.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub mode: ConversionMode,
}

impl Job {
    pub fn input_stem(&self) -> String {
        stem_of(&self.input)
    }
}

pub(crate) fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
