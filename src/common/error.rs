//! Error taxonomy shared by the pipeline and both front ends.

use std::path::PathBuf;
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Please upload a media file or provide a video URL")]
    MissingInput,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Download failed: {0}")]
    AcquisitionFailed(String),

    #[error("{0} is required but was not found on PATH")]
    ToolUnavailable(String),

    #[error("Conversion failed at variant {} of {total} ({})", .index + 1, .output.display())]
    ConversionFailed {
        /// Zero-based position of the failing variant in the batch.
        index: usize,
        total: usize,
        exit_code: Option<i32>,
        output: PathBuf,
        detail: String,
    },

    #[error("Not found")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn acquisition_failed(message: impl Into<String>) -> Self {
        Self::AcquisitionFailed(message.into())
    }
}
