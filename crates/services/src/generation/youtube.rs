use std::env;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use quiz_core::model::{VideoId, parse_iso8601_duration};

use super::validate_base_url;
use crate::error::{GenerationError, SettingsError};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const CAPTION_LANGUAGES: [&str; 2] = ["es", "en"];

#[derive(Clone, Debug)]
pub struct YouTubeConfig {
    pub base_url: String,
    pub api_key: String,
}

impl YouTubeConfig {
    /// Config for `api_key`, honouring `QUIZ_YOUTUBE_BASE_URL` when set.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidBaseUrl` if the override is not an http(s) URL.
    pub fn from_key(api_key: impl Into<String>) -> Result<Self, SettingsError> {
        let base_url = match env::var("QUIZ_YOUTUBE_BASE_URL") {
            Ok(raw) => validate_base_url(&raw)?,
            Err(_) => DEFAULT_BASE_URL.to_owned(),
        };
        Ok(Self {
            base_url,
            api_key: api_key.into(),
        })
    }
}

/// Thin client over the YouTube Data API: video duration and captions.
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    #[must_use]
    pub fn new(client: Client, config: YouTubeConfig) -> Self {
        Self { client, config }
    }

    /// Video length in whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::VideoNotFound` when the API knows no such video.
    pub async fn video_duration(&self, video_id: &VideoId) -> Result<u32, GenerationError> {
        let url = self.endpoint(
            "videos",
            &[
                ("id", video_id.as_str()),
                ("part", "contentDetails"),
                ("key", self.config.api_key.as_str()),
            ],
        )?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus {
                service: "youtube",
                status: response.status(),
            });
        }

        let body: VideoListResponse = response.json().await?;
        let item = body
            .items
            .into_iter()
            .next()
            .ok_or(GenerationError::VideoNotFound)?;
        let secs = parse_iso8601_duration(&item.content_details.duration)?;
        tracing::debug!(%video_id, secs, "video duration fetched");
        Ok(secs)
    }

    /// Caption text in the first supported language.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::NoCaptions` if no Spanish or English track exists.
    pub async fn transcript(&self, video_id: &VideoId) -> Result<String, GenerationError> {
        let url = self.endpoint(
            "captions",
            &[("videoId", video_id.as_str()), ("part", "snippet")],
        )?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus {
                service: "youtube",
                status: response.status(),
            });
        }

        let body: CaptionListResponse = response.json().await?;
        let track = pick_caption_track(body.items).ok_or(GenerationError::NoCaptions)?;

        let url = self.endpoint(&format!("captions/{}", track.id), &[])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus {
                service: "youtube",
                status: response.status(),
            });
        }

        let caption: CaptionBody = response.json().await?;
        Ok(caption.text)
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, GenerationError> {
        let raw = format!("{}/{path}", self.config.base_url);
        Url::parse_with_params(&raw, params)
            .map_err(|_| SettingsError::InvalidBaseUrl(raw).into())
    }
}

fn pick_caption_track(items: Vec<CaptionTrack>) -> Option<CaptionTrack> {
    items
        .into_iter()
        .find(|item| CAPTION_LANGUAGES.contains(&item.snippet.language.as_str()))
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
struct CaptionListResponse {
    #[serde(default)]
    items: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    id: String,
    snippet: CaptionSnippet,
}

#[derive(Debug, Deserialize)]
struct CaptionSnippet {
    language: String,
}

#[derive(Debug, Deserialize)]
struct CaptionBody {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_caption_language() {
        let body: CaptionListResponse = serde_json::from_str(
            r#"{"items":[
                {"id":"fr1","snippet":{"language":"fr"}},
                {"id":"en1","snippet":{"language":"en"}},
                {"id":"es1","snippet":{"language":"es"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(pick_caption_track(body.items).unwrap().id, "en1");
    }

    #[test]
    fn no_supported_caption_language() {
        let body: CaptionListResponse =
            serde_json::from_str(r#"{"items":[{"id":"de","snippet":{"language":"de"}}]}"#)
                .unwrap();
        assert!(pick_caption_track(body.items).is_none());
        let empty: CaptionListResponse = serde_json::from_str("{}").unwrap();
        assert!(pick_caption_track(empty.items).is_none());
    }

    #[test]
    fn endpoint_encodes_query() {
        let client = YouTubeClient::new(
            Client::new(),
            YouTubeConfig {
                base_url: DEFAULT_BASE_URL.into(),
                api_key: "k y".into(),
            },
        );
        let url = client
            .endpoint("videos", &[("id", "dQw4w9WgXcQ"), ("key", "k y")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/videos?id=dQw4w9WgXcQ&key=k+y"
        );
    }

    #[test]
    fn video_list_reads_duration() {
        let body: VideoListResponse = serde_json::from_str(
            r#"{"items":[{"contentDetails":{"duration":"PT4M13S"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.items[0].content_details.duration, "PT4M13S");
    }
}
