use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerHost,
    ServerPort,
    UploadDir,
    DownloadDir,
    OutputDir,
    FfmpegBin,
    YtDlpBin,
    MaxUploadBytes,
    AllowedExtensions,
    DefaultMp3Bitrates,
    DefaultMp4Resolutions,
    DefaultVideoBitrate,
    DefaultAudioBitrate,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerHost => "APP_HOST",
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::UploadDir => "UPLOAD_DIR",
            EnvKey::DownloadDir => "DOWNLOAD_DIR",
            EnvKey::OutputDir => "OUTPUT_DIR",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::YtDlpBin => "YTDLP_BIN",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
            EnvKey::AllowedExtensions => "ALLOWED_EXTENSIONS",
            EnvKey::DefaultMp3Bitrates => "DEFAULT_MP3_BITRATES",
            EnvKey::DefaultMp4Resolutions => "DEFAULT_MP4_RESOLUTIONS",
            EnvKey::DefaultVideoBitrate => "DEFAULT_VIDEO_BITRATE",
            EnvKey::DefaultAudioBitrate => "DEFAULT_AUDIO_BITRATE",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Comma-separated list variable. Unset or blank falls back to `default`.
pub fn get_list(key: EnvKey, default: &[&str]) -> Vec<String> {
    let parsed = get(key)
        .map(|val| crate::pipeline::plan::parse_csv(&val))
        .unwrap_or_default();

    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}
