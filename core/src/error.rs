use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::format::OutputFormat;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Remote payload whose content type does not declare an image.
#[derive(Debug, Error)]
#[error("{url} isn't an image, content-type: {}", .content_type.as_deref().unwrap_or("<missing>"))]
pub struct NotAnImageError {
    pub url: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("input exceeds limits: {0}")]
    Limits(String),

    #[error("quantization failed: {0}")]
    Quantize(String),

    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("optimization failed: {0}")]
    Optimize(String),

    #[error("codec task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
#[error("can't convert {item} to {format}: {source}")]
pub struct EncodeError {
    pub item: String,
    pub format: OutputFormat,
    pub source: CodecError,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config under `{key}`: {source}")]
    Parse {
        key: String,
        source: serde_json::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Failure of one pipeline instance, attributed to the stage that raised it.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    NotAnImage(#[from] NotAnImageError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to measure dimensions of {item}: {source}")]
    Measure { item: String, source: CodecError },
}

impl ProcessingError {
    pub fn stage(&self) -> &'static str {
        match self {
            ProcessingError::Fetch(_) => "fetch",
            ProcessingError::NotAnImage(_) => "guard",
            ProcessingError::Encode(_) => "convert",
            ProcessingError::Measure { .. } => "measure",
        }
    }
}
