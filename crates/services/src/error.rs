//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{DurationError, QuestionError, SessionStateError};
use storage::repository::StorageError;

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted while producing a question set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("missing API credentials: {0} is not configured")]
    MissingCredentials(&'static str),
    #[error("request to {service} failed with status {status}")]
    HttpStatus {
        service: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("question generator returned an empty response")]
    EmptyResponse,
    #[error("video not found")]
    VideoNotFound,
    #[error("no captions available in a supported language")]
    NoCaptions,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Errors emitted by `ApiKeySettings` and the service configs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the quiz engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no question is active")]
    NoActiveQuestion,
    #[error("answer index {index} is out of range for {len} answers")]
    InvalidAnswer { index: usize, len: usize },
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
