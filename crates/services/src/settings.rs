use std::env;
use std::sync::Arc;

use storage::repository::KeyValueStore;

use crate::error::SettingsError;
use crate::generation::{AiConfig, OpenAiQuestionSource, YouTubeConfig};

const OPENAI_KEY: &str = "openai_api_key";
const YOUTUBE_KEY: &str = "youtube_api_key";

const OPENAI_ENV: &str = "QUIZ_AI_API_KEY";
const YOUTUBE_ENV: &str = "QUIZ_YOUTUBE_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    pub openai_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl ApiKeys {
    #[must_use]
    pub fn are_configured(&self) -> bool {
        self.openai_api_key.is_some() && self.youtube_api_key.is_some()
    }

    /// Question source using these keys; a missing key surfaces when generating.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidBaseUrl` for a bad base URL override.
    pub fn question_source(&self) -> Result<OpenAiQuestionSource, SettingsError> {
        let ai = self.openai_api_key.clone().map(AiConfig::from_key).transpose()?;
        let youtube = self
            .youtube_api_key
            .clone()
            .map(YouTubeConfig::from_key)
            .transpose()?;
        Ok(OpenAiQuestionSource::new(ai, youtube))
    }
}

/// API keys saved in the key-value store. Environment variables win over saved keys.
#[derive(Clone)]
pub struct ApiKeySettings {
    kv: Arc<dyn KeyValueStore>,
}

impl ApiKeySettings {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Save both keys. Blank values remove the saved key.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Storage` if the store fails.
    pub async fn configure(&self, openai_api_key: &str, youtube_api_key: &str) -> Result<(), SettingsError> {
        self.put(OPENAI_KEY, openai_api_key).await?;
        self.put(YOUTUBE_KEY, youtube_api_key).await?;
        tracing::info!("api keys updated");
        Ok(())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let value = value.trim();
        if value.is_empty() {
            self.kv.remove(key).await?;
        } else {
            self.kv.set(key, value).await?;
        }
        Ok(())
    }

    /// Keys as saved, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Storage` if the store fails.
    pub async fn stored(&self) -> Result<ApiKeys, SettingsError> {
        Ok(ApiKeys {
            openai_api_key: non_blank(self.kv.get(OPENAI_KEY).await?),
            youtube_api_key: non_blank(self.kv.get(YOUTUBE_KEY).await?),
        })
    }

    /// Effective keys: environment first, then saved values.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Storage` if the store fails.
    pub async fn load(&self) -> Result<ApiKeys, SettingsError> {
        let stored = self.stored().await?;
        Ok(overlay_env(stored, |name| env::var(name).ok()))
    }

    /// # Errors
    ///
    /// Returns `SettingsError::Storage` if the store fails.
    pub async fn are_configured(&self) -> Result<bool, SettingsError> {
        Ok(self.load().await?.are_configured())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn overlay_env(stored: ApiKeys, lookup: impl Fn(&str) -> Option<String>) -> ApiKeys {
    ApiKeys {
        openai_api_key: non_blank(lookup(OPENAI_ENV)).or(stored.openai_api_key),
        youtube_api_key: non_blank(lookup(YOUTUBE_ENV)).or(stored.youtube_api_key),
    }
}

#[cfg(test)]
mod tests {
    use storage::repository::InMemoryRepository;

    use super::*;

    #[tokio::test]
    async fn configure_round_trips_and_blank_removes() {
        let settings = ApiKeySettings::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(settings.stored().await.unwrap(), ApiKeys::default());

        settings.configure(" sk-1 ", "yt-1").await.unwrap();
        let keys = settings.stored().await.unwrap();
        assert_eq!(keys.openai_api_key.as_deref(), Some("sk-1"));
        assert_eq!(keys.youtube_api_key.as_deref(), Some("yt-1"));
        assert!(keys.are_configured());

        settings.configure("sk-2", "  ").await.unwrap();
        let keys = settings.stored().await.unwrap();
        assert_eq!(keys.openai_api_key.as_deref(), Some("sk-2"));
        assert!(keys.youtube_api_key.is_none());
        assert!(!keys.are_configured());
    }

    #[test]
    fn environment_wins_over_stored_keys() {
        let stored = ApiKeys {
            openai_api_key: Some("stored-ai".into()),
            youtube_api_key: Some("stored-yt".into()),
        };
        let keys = overlay_env(stored, |name| match name {
            OPENAI_ENV => Some("env-ai".into()),
            YOUTUBE_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(keys.openai_api_key.as_deref(), Some("env-ai"));
        assert_eq!(keys.youtube_api_key.as_deref(), Some("stored-yt"));
    }
}
