//! Filesystem-backed job registry.
//!
//! Each job owns `uploads/{id}/`, `downloads/{id}/` and `output/{id}/` under
//! the configured roots. The unique id is the only thing keeping concurrent
//! jobs apart, so ids are random v4 UUIDs and every lookup stays inside the
//! job's own directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::common::error::{ConvertError, ConvertResult};
use crate::config::settings::AppConfig;

/// Opaque job identifier, rendered as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

impl FromStr for JobId {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only the simple and hyphenated forms; braced/URN forms never name a directory.
        if s.len() != 32 && s.len() != 36 {
            return Err(ConvertError::NotFound);
        }
        Uuid::parse_str(s).map(Self).map_err(|_| ConvertError::NotFound)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for JobId {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone)]
pub struct JobRegistry {
    upload_root: PathBuf,
    download_root: PathBuf,
    output_root: PathBuf,
}

impl JobRegistry {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upload_root: config.upload_dir.clone(),
            download_root: config.download_dir.clone(),
            output_root: config.output_dir.clone(),
        }
    }

    /// Fresh identifier. Touches nothing on disk.
    pub fn allocate(&self) -> JobId {
        JobId::new()
    }

    pub fn upload_dir(&self, id: &JobId) -> PathBuf {
        self.upload_root.join(id.to_string())
    }

    pub fn download_dir(&self, id: &JobId) -> PathBuf {
        self.download_root.join(id.to_string())
    }

    pub fn output_dir(&self, id: &JobId) -> PathBuf {
        self.output_root.join(id.to_string())
    }

    pub async fn create_output_dir(&self, id: &JobId) -> ConvertResult<PathBuf> {
        let dir = self.output_dir(id);
        fs::create_dir_all(&dir).await?;
        debug!("Output directory ready: {}", dir.display());
        Ok(dir)
    }

    /// Remove whatever a rejected request left in the job's upload directory.
    pub async fn discard_uploads(&self, id: &JobId) {
        let dir = self.upload_dir(id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => debug!("Discarded uploads for job {}", id),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to discard {}: {}", dir.display(), e),
        }
    }

    /// Path of `filename` inside the job's output directory, or `NotFound`.
    pub async fn resolve(&self, id: &JobId, filename: &str) -> ConvertResult<PathBuf> {
        let name = safe_file_name(filename).ok_or(ConvertError::NotFound)?;
        let path = self.output_dir(id).join(name);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(ConvertError::NotFound),
        }
    }

    /// Sorted names of the regular files in the job's output directory.
    pub async fn list_outputs(&self, id: &JobId) -> ConvertResult<Vec<String>> {
        list_files(&self.output_dir(id)).await
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub async fn list_files(dir: &Path) -> ConvertResult<Vec<String>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ConvertError::NotFound),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Accept `filename` only if it is a single plain path component.
fn safe_file_name(filename: &str) -> Option<&str> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
    {
        return None;
    }
    Some(filename)
}
