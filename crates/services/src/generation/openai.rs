use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use quiz_core::model::{QuestionSet, VideoId, parse_question_document, target_question_count};

use super::youtube::{YouTubeClient, YouTubeConfig};
use super::{QuestionSource, validate_base_url};
use crate::error::{GenerationError, SettingsError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";

const SYSTEM_PROMPT: &str = "You are an expert at writing educational questions about video \
content. Spread the questions evenly across the video, roughly one per minute.";

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl AiConfig {
    /// Config for `api_key`, honouring `QUIZ_AI_BASE_URL` and `QUIZ_AI_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidBaseUrl` if the override is not an http(s) URL.
    pub fn from_key(api_key: impl Into<String>) -> Result<Self, SettingsError> {
        let base_url = match env::var("QUIZ_AI_BASE_URL") {
            Ok(raw) => validate_base_url(&raw)?,
            Err(_) => DEFAULT_BASE_URL.to_owned(),
        };
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            model,
        })
    }
}

/// Generates questions with an OpenAI-compatible chat completion endpoint, fed
/// with the video's captions.
#[derive(Clone)]
pub struct OpenAiQuestionSource {
    client: Client,
    config: Option<AiConfig>,
    youtube: Option<YouTubeClient>,
}

impl OpenAiQuestionSource {
    #[must_use]
    pub fn new(config: Option<AiConfig>, youtube: Option<YouTubeConfig>) -> Self {
        let client = Client::new();
        Self {
            youtube: youtube.map(|cfg| YouTubeClient::new(client.clone(), cfg)),
            client,
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some() && self.youtube.is_some()
    }

    async fn complete(&self, config: &AiConfig, prompt: String) -> Result<String, GenerationError> {
        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus {
                service: "openai",
                status: response.status(),
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl QuestionSource for OpenAiQuestionSource {
    async fn generate(
        &self,
        video_id: &VideoId,
        title: &str,
        description: &str,
    ) -> Result<QuestionSet, GenerationError> {
        let config = self
            .config
            .as_ref()
            .ok_or(GenerationError::MissingCredentials("QUIZ_AI_API_KEY"))?;
        let youtube = self
            .youtube
            .as_ref()
            .ok_or(GenerationError::MissingCredentials("QUIZ_YOUTUBE_API_KEY"))?;

        let transcript = youtube.transcript(video_id).await?;
        let duration = youtube.video_duration(video_id).await?;
        let count = target_question_count(duration);

        tracing::info!(%video_id, duration, count, "requesting generated questions");
        let content = self
            .complete(config, build_prompt(title, description, &transcript, count))
            .await
            .inspect_err(|err| tracing::warn!(%video_id, %err, "question generation failed"))?;

        let questions = parse_question_document(&content)?;
        let set = QuestionSet::distributed(questions, duration)?;
        tracing::info!(%video_id, questions = set.len(), "questions generated");
        Ok(set)
    }
}

/// User prompt asking for `count` multiple choice questions as a JSON document.
#[must_use]
pub fn build_prompt(title: &str, description: &str, transcript: &str, count: u32) -> String {
    format!(
        r#"Based on the following YouTube video content:

Title: {title}
Description: {description}
Transcript: {transcript}

Write {count} multiple choice questions that:
1. Are relevant to the video content
2. Have 4 answer options each
3. Have exactly one correct answer
4. Include 2 hints per question
5. Vary in difficulty
6. Are spread across the video (about one per minute)

Reply with JSON in this shape:
{{
    "questions": [
        {{
            "question": "question text",
            "time": time_in_seconds,
            "answers": [
                {{"text": "answer 1", "correct": true/false}},
                {{"text": "answer 2", "correct": true/false}},
                {{"text": "answer 3", "correct": true/false}},
                {{"text": "answer 4", "correct": true/false}}
            ],
            "hints": ["hint 1", "hint 2"]
        }}
    ]
}}"#
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
