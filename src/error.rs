use std::io;
use thiserror::Error;
use url;

/// Error types for the application.
///
/// The taxonomy splits into run-fatal conditions (bad input URL, outline
/// fetch problems, missing login session) and per-unit conditions
/// (extraction, download, probe) that are collected into the run summary
/// while processing continues with the remaining units.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid course URL: {0}")]
    InvalidUrl(String),

    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("outline fetch failed: {0}")]
    OutlineFetch(String),

    #[error("login session required: {0}")]
    AuthRequired(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("URL probe failed: {0}")]
    ProbeFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
