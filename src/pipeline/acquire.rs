//! Obtains the single source file a job converts.

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use url::Url;

use crate::common::error::{ConvertError, ConvertResult};
use crate::common::upload::{UploadedFile, extension_of};
use crate::config::settings::AppConfig;
use crate::infrastructure::storage::registry::{JobId, JobRegistry, list_files};
use crate::pipeline::runner::{CommandInvocation, CommandRunner};

/// Fixed base name the downloader writes to; the tool picks the extension.
pub const DOWNLOAD_BASE_NAME: &str = "source";

/// Best video plus best audio, or the best single file holding both.
const DOWNLOAD_FORMAT: &str = "bv*+ba/b";

#[derive(Debug, Clone)]
pub enum InputSource {
    /// Streamed into the job's upload directory by the HTTP front end.
    Upload(UploadedFile),
    Remote(String),
    /// A file already on this machine (CLI only).
    Local(PathBuf),
}

impl InputSource {
    /// Check the request without touching the filesystem. Local paths are
    /// checked when the input is acquired.
    pub fn validate(&self, config: &AppConfig) -> ConvertResult<()> {
        match self {
            InputSource::Upload(upload) => validate_upload_name(&upload.file_name, config),
            InputSource::Remote(url) => parse_remote_url(url).map(|_| ()),
            InputSource::Local(_) => Ok(()),
        }
    }

    /// External programs this source needs besides the encoder.
    pub fn required_tool<'a>(&self, config: &'a AppConfig) -> Option<&'a str> {
        match self {
            InputSource::Remote(_) => Some(config.ytdlp_bin.as_str()),
            _ => None,
        }
    }
}

/// The extension of a client-claimed file name must be on the allowlist.
pub fn validate_upload_name(file_name: &str, config: &AppConfig) -> ConvertResult<()> {
    match extension_of(file_name) {
        Some(ext) if config.is_allowed_extension(&ext) => Ok(()),
        Some(ext) => Err(ConvertError::UnsupportedType(ext)),
        None => Err(ConvertError::UnsupportedType(file_name.to_string())),
    }
}

fn parse_remote_url(raw: &str) -> ConvertResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConvertError::invalid_request(format!("invalid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConvertError::invalid_request(format!(
            "unsupported URL scheme: {other}"
        ))),
    }
}

/// Downloader invocation writing `{dir}/source.<ext>`.
pub fn download_invocation(ytdlp: &str, url: &str, dir: &Path) -> CommandInvocation {
    let template = dir.join(format!("{DOWNLOAD_BASE_NAME}.%(ext)s"));

    CommandInvocation::new(ytdlp)
        .args(["--no-playlist", "-f", DOWNLOAD_FORMAT, "-o"])
        .arg(&template)
        .arg("--")
        .arg(url)
}

pub struct InputAcquirer<'a> {
    runner: &'a dyn CommandRunner,
    registry: &'a JobRegistry,
    config: &'a AppConfig,
}

impl<'a> InputAcquirer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, registry: &'a JobRegistry, config: &'a AppConfig) -> Self {
        Self {
            runner,
            registry,
            config,
        }
    }

    /// Produce a local path for `source` under the job's own directories.
    pub async fn acquire(&self, id: &JobId, source: &InputSource) -> ConvertResult<PathBuf> {
        match source {
            InputSource::Upload(upload) => Ok(upload.path.clone()),
            InputSource::Remote(url) => self.download(id, url).await,
            InputSource::Local(path) => match tokio::fs::metadata(path).await {
                Ok(meta) if meta.is_file() => Ok(path.clone()),
                _ => Err(ConvertError::invalid_request(format!(
                    "{} is not a readable file",
                    path.display()
                ))),
            },
        }
    }

    async fn download(&self, id: &JobId, raw_url: &str) -> ConvertResult<PathBuf> {
        let url = parse_remote_url(raw_url)?;
        let dir = self.registry.download_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        info!("⬇️ Downloading {} into {}", url, dir.display());

        let outcome = self
            .runner
            .run(&download_invocation(&self.config.ytdlp_bin, url.as_str(), &dir))
            .await
            .map_err(|e| ConvertError::acquisition_failed(format!("could not start downloader: {e}")))?;

        if !outcome.is_success() {
            error!("Downloader exited with {:?}: {}", outcome.code, outcome.stderr_tail);
            return Err(ConvertError::acquisition_failed(format!(
                "downloader exited with status {}",
                outcome
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string())
            )));
        }

        let prefix = format!("{DOWNLOAD_BASE_NAME}.");
        let produced = list_files(&dir)
            .await?
            .into_iter()
            .find(|name| name.starts_with(&prefix) && !name.ends_with(".part"));

        match produced {
            Some(name) => {
                info!("⬇️ Downloaded {}", name);
                Ok(dir.join(name))
            }
            None => {
                warn!("Downloader reported success but produced no file in {}", dir.display());
                Err(ConvertError::acquisition_failed(
                    "download failed to produce a file",
                ))
            }
        }
    }
}
