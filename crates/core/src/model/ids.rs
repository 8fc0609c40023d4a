use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Length of every YouTube video identifier.
pub const VIDEO_ID_LEN: usize = 11;

// The leading `.*` is greedy, so the last recognised marker in the URL wins.
static VIDEO_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("video url pattern should compile")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VideoIdError {
    #[error("video id must be exactly {VIDEO_ID_LEN} characters, got {len}")]
    InvalidLength { len: usize },

    #[error("video id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Identifier of a YouTube video (always 11 characters).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Validates a raw token as a video id.
    ///
    /// # Errors
    ///
    /// Returns `VideoIdError` if the token is not 11 characters long or contains
    /// characters that terminate a URL component.
    pub fn new(raw: impl Into<String>) -> Result<Self, VideoIdError> {
        let raw = raw.into();
        let len = raw.chars().count();
        if len != VIDEO_ID_LEN {
            return Err(VideoIdError::InvalidLength { len });
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| matches!(c, '#' | '&' | '?' | '/') || c.is_whitespace())
        {
            return Err(VideoIdError::InvalidCharacter(bad));
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extracts the video id from any of the common YouTube URL shapes.
///
/// Accepts `watch?v=`, `&v=`, `youtu.be/`, `embed/`, `v/` and `u/<x>/` forms.
/// Returns `None` when no marker is present or the token is not 11 characters.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    let captures = VIDEO_URL_PATTERN.captures(url)?;
    let token = captures.get(2)?.as_str();
    VideoId::new(token).ok()
}

impl FromStr for VideoId {
    type Err = VideoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VideoId {
    type Error = VideoIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VideoId> for String {
    fn from(value: VideoId) -> Self {
        value.0
    }
}

impl fmt::Debug for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoId({})", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_short_link() {
        let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn extracts_from_watch_embed_and_v_links() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1",
            "https://www.youtube.com/v/dQw4w9WgXcQ#t=30",
        ] {
            let id = extract_video_id(url).unwrap_or_else(|| panic!("no id for {url}"));
            assert_eq!(id.as_str(), "dQw4w9WgXcQ", "{url}");
        }
    }

    #[test]
    fn rejects_urls_without_marker_or_wrong_length() {
        assert!(extract_video_id("https://example.com/").is_none());
        assert!(extract_video_id("https://youtu.be/short").is_none());
        assert!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQX").is_none());
    }

    #[test]
    fn serde_round_trips_through_plain_string() {
        let id = VideoId::new("dQw4w9WgXcQ").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"dQw4w9WgXcQ\"");
        let back: VideoId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<VideoId>("\"nope\"").is_err());
    }
}
