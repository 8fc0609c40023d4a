//! Producing question sets for a video from external services.

mod openai;
mod youtube;

use async_trait::async_trait;

use quiz_core::model::{QuestionSet, VideoId};

use crate::error::GenerationError;

pub use openai::{AiConfig, OpenAiQuestionSource, build_prompt};
pub use youtube::{YouTubeClient, YouTubeConfig};

/// Anything that can produce a timed question set for a video.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Generate questions for `video_id`, already redistributed over the video.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if credentials are missing, a request fails, or
    /// the generated document is malformed.
    async fn generate(
        &self,
        video_id: &VideoId,
        title: &str,
        description: &str,
    ) -> Result<QuestionSet, GenerationError>;
}

pub(crate) fn validate_base_url(raw: &str) -> Result<String, crate::error::SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(trimmed.to_owned()),
        _ => Err(crate::error::SettingsError::InvalidBaseUrl(raw.to_owned())),
    }
}
