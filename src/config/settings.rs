use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::env::{self, EnvKey};
use crate::pipeline::plan::PlanDefaults;

pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 7] = ["mp3", "mp4", "mov", "mkv", "wav", "aac", "flac"];
pub const DEFAULT_MP3_BITRATES: [&str; 3] = ["128k", "192k", "320k"];
pub const DEFAULT_MP4_RESOLUTIONS: [&str; 3] = ["1920:1080", "1280:720", "854:480"];
pub const DEFAULT_VIDEO_BITRATE: &str = "2000k";
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Room for multipart framing and text fields on top of the upload cap.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Process-wide settings, built once at start-up and shared read-only.
#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub download_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub ytdlp_bin: String,
    pub max_upload_bytes: usize,
    pub allowed_extensions: BTreeSet<String>,
    pub defaults: PlanDefaults,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server_host: env::get_or(EnvKey::ServerHost, "0.0.0.0"),
            server_port: env::get_parsed(EnvKey::ServerPort, 5000),
            upload_dir: env::get_or(EnvKey::UploadDir, "uploads").into(),
            download_dir: env::get_or(EnvKey::DownloadDir, "downloads").into(),
            output_dir: env::get_or(EnvKey::OutputDir, "output").into(),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            ytdlp_bin: env::get_or(EnvKey::YtDlpBin, "yt-dlp"),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
            allowed_extensions: env::get_list(EnvKey::AllowedExtensions, &DEFAULT_ALLOWED_EXTENSIONS)
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            defaults: PlanDefaults {
                mp3_bitrates: env::get_list(EnvKey::DefaultMp3Bitrates, &DEFAULT_MP3_BITRATES),
                mp4_resolutions: env::get_list(EnvKey::DefaultMp4Resolutions, &DEFAULT_MP4_RESOLUTIONS),
                video_bitrate: env::get_or(EnvKey::DefaultVideoBitrate, DEFAULT_VIDEO_BITRATE),
                audio_bitrate: env::get_or(EnvKey::DefaultAudioBitrate, DEFAULT_AUDIO_BITRATE),
            },
        }
    }

    /// Same settings with every storage root placed under `root`.
    pub fn rooted_at(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.upload_dir = root.join("uploads");
        self.download_dir = root.join("downloads");
        self.output_dir = root.join("output");
        self
    }

    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.contains(&ext.to_lowercase())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            upload_dir: "uploads".into(),
            download_dir: "downloads".into(),
            output_dir: "output".into(),
            ffmpeg_bin: "ffmpeg".to_string(),
            ytdlp_bin: "yt-dlp".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            defaults: PlanDefaults::default(),
        }
    }
}
