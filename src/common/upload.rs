use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::common::error::{ConvertError, ConvertResult};

/// A client upload already written to disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name claimed by the client. Untrusted.
    pub file_name: String,
    /// Where the bytes were stored, under the sanitized name.
    pub path: PathBuf,
    pub size: u64,
}

impl UploadedFile {
    /// Lowercased text after the last `.`, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.file_name)
    }
}

/// Lowercased text after the last `.` of `name`, if any.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Map a multipart failure onto the request error taxonomy. A body over the
/// route's limit is reported like any other oversized upload.
pub fn multipart_error(err: MultipartError, limit: usize) -> ConvertError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ConvertError::invalid_request(format!("upload exceeds the {limit} byte limit"))
    } else {
        error!("Multipart error: {}", err);
        ConvertError::invalid_request(err.body_text())
    }
}

/// Stream a multipart file field into `dir` under its sanitized name.
pub async fn store_upload(field: Field<'_>, dir: &Path, limit: usize) -> ConvertResult<UploadedFile> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let chunks = field.map(move |chunk| chunk.map_err(|e| multipart_error(e, limit)));

    store_stream(chunks, dir, &file_name, limit).await
}

/// Write `chunks` to `dir/<sanitized file_name>` as they arrive, creating
/// `dir` if needed. Nothing over `limit` bytes is kept: an oversized or
/// interrupted upload removes its partial file.
pub async fn store_stream<S, E>(
    chunks: S,
    dir: &Path,
    file_name: &str,
    limit: usize,
) -> ConvertResult<UploadedFile>
where
    S: Stream<Item = Result<Bytes, E>>,
    ConvertError: From<E>,
{
    fs::create_dir_all(dir).await?;
    let path = dir.join(sanitize_file_name(file_name));
    let mut file = fs::File::create(&path).await?;

    let written = write_chunks(chunks, &mut file, limit).await;
    drop(file);

    match written {
        Ok(size) => {
            info!("Stored upload ({} bytes) at {}", size, path.display());
            Ok(UploadedFile {
                file_name: file_name.to_string(),
                path,
                size,
            })
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&path).await {
                warn!("Failed to remove partial upload {}: {}", path.display(), rm);
            }
            Err(e)
        }
    }
}

async fn write_chunks<S, E>(chunks: S, file: &mut fs::File, limit: usize) -> ConvertResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    ConvertError: From<E>,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut size: u64 = 0;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        size += chunk.len() as u64;
        if size > limit as u64 {
            return Err(ConvertError::invalid_request(format!(
                "upload exceeds the {limit} byte limit"
            )));
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(size)
}

/// Reduce a client-supplied name to a safe single path component.
///
/// Only the final component survives, characters outside `[A-Za-z0-9._-]`
/// become `_`, and leading dots are stripped.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stripped = cleaned.trim_start_matches('.');

    if stripped.is_empty() {
        "upload".to_string()
    } else if stripped.len() != cleaned.len() && !stripped.contains('.') {
        // ".mp3" keeps its extension
        format!("upload.{stripped}")
    } else {
        stripped.to_string()
    }
}
