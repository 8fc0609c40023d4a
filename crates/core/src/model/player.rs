use std::fmt;

/// State change reported by the video player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Playing,
    Paused,
    Ended,
    /// Raw error code as reported by the embedded player.
    Error(i32),
}

/// User-facing category of a player error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerErrorKind {
    InvalidVideoId,
    PlayerFault,
    NotFound,
    EmbeddingDisallowed,
    Unknown,
}

impl PlayerErrorKind {
    /// Map an embedded-player error code to its category.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::InvalidVideoId,
            5 => Self::PlayerFault,
            100 => Self::NotFound,
            101 | 150 => Self::EmbeddingDisallowed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidVideoId => "invalid video id",
            Self::PlayerFault => "the video player failed",
            Self::NotFound => "the requested video does not exist or was removed",
            Self::EmbeddingDisallowed => "the owner does not allow playback on external sites",
            Self::Unknown => "check that the URL is correct and the video is available",
        }
    }
}

impl fmt::Display for PlayerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_categories() {
        assert_eq!(PlayerErrorKind::from_code(2), PlayerErrorKind::InvalidVideoId);
        assert_eq!(PlayerErrorKind::from_code(5), PlayerErrorKind::PlayerFault);
        assert_eq!(PlayerErrorKind::from_code(100), PlayerErrorKind::NotFound);
        assert_eq!(
            PlayerErrorKind::from_code(101),
            PlayerErrorKind::EmbeddingDisallowed
        );
        assert_eq!(
            PlayerErrorKind::from_code(150),
            PlayerErrorKind::EmbeddingDisallowed
        );
        assert_eq!(PlayerErrorKind::from_code(-1), PlayerErrorKind::Unknown);
    }
}
