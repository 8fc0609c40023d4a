use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{AnswerRecord, DEFAULT_LEVEL, ProgressSnapshot, ScoreRecord, VideoId};
use storage::repository::KeyValueStore;

use crate::error::ProgressError;

const PROGRESS_KEY: &str = "videoInteractiveProgress";
const ANSWERS_KEY: &str = "videoInteractiveAnswers";
const SCORE_KEY: &str = "videoInteractiveScore";

/// How progress keys are derived from the video id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScheme {
    /// One slot per video: `videoInteractiveProgress:<id>`.
    #[default]
    PerVideo,
    /// One shared slot for whichever video is loaded, as the browser build stored it.
    Global,
}

impl KeyScheme {
    fn key(self, base: &str, video_id: &VideoId) -> String {
        match self {
            Self::PerVideo => format!("{base}:{video_id}"),
            Self::Global => base.to_owned(),
        }
    }
}

/// Durable snapshot of quiz progress (cursor, answer log, score).
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
    scheme: KeyScheme,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            kv,
            clock,
            scheme: KeyScheme::default(),
        }
    }

    #[must_use]
    pub fn with_key_scheme(mut self, scheme: KeyScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Overwrite the saved cursor and answer log.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if serialization or the store fails.
    pub async fn save(
        &self,
        video_id: &VideoId,
        cursor: usize,
        answer_log: &[AnswerRecord],
    ) -> Result<(), ProgressError> {
        let answers = serde_json::to_string(answer_log)?;
        self.kv
            .set(&self.scheme.key(PROGRESS_KEY, video_id), &cursor.to_string())
            .await?;
        self.kv
            .set(&self.scheme.key(ANSWERS_KEY, video_id), &answers)
            .await?;
        tracing::debug!(%video_id, cursor, "progress saved");
        Ok(())
    }

    /// Overwrite the saved score, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if serialization or the store fails.
    pub async fn save_score(
        &self,
        video_id: &VideoId,
        score: i64,
        level: u32,
    ) -> Result<(), ProgressError> {
        let record = ScoreRecord {
            score,
            level,
            date: self.clock.now(),
        };
        let raw = serde_json::to_string(&record)?;
        self.kv
            .set(&self.scheme.key(SCORE_KEY, video_id), &raw)
            .await?;
        Ok(())
    }

    /// Load saved progress.
    ///
    /// Returns `None` when nothing is saved. Unreadable or inconsistent data wipes
    /// the saved progress and also returns `None`, so a reload never resumes from a
    /// partial state.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` only when the store itself fails.
    pub async fn load(&self, video_id: &VideoId) -> Result<Option<ProgressSnapshot>, ProgressError> {
        let cursor = self.kv.get(&self.scheme.key(PROGRESS_KEY, video_id)).await?;
        let answers = self.kv.get(&self.scheme.key(ANSWERS_KEY, video_id)).await?;
        let score = self.kv.get(&self.scheme.key(SCORE_KEY, video_id)).await?;

        if cursor.is_none() && answers.is_none() {
            return Ok(None);
        }

        match parse_snapshot(cursor.as_deref(), answers.as_deref(), score.as_deref()) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(reason) => {
                tracing::warn!(%video_id, reason, "saved progress is corrupt, resetting");
                self.reset(video_id).await?;
                Ok(None)
            }
        }
    }

    /// Remove saved cursor, answer log and score.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the store fails.
    pub async fn reset(&self, video_id: &VideoId) -> Result<(), ProgressError> {
        for base in [PROGRESS_KEY, ANSWERS_KEY, SCORE_KEY] {
            self.kv.remove(&self.scheme.key(base, video_id)).await?;
        }
        tracing::info!(%video_id, "progress reset");
        Ok(())
    }
}

fn parse_snapshot(
    cursor: Option<&str>,
    answers: Option<&str>,
    score: Option<&str>,
) -> Result<ProgressSnapshot, &'static str> {
    let cursor: usize = match cursor {
        Some(raw) => raw.trim().parse().map_err(|_| "cursor is not a number")?,
        None => return Err("answer log without cursor"),
    };
    let answer_log: Vec<AnswerRecord> = match answers {
        Some(raw) => serde_json::from_str(raw).map_err(|_| "answer log is not valid JSON")?,
        None => Vec::new(),
    };
    let (score, level) = match score {
        Some(raw) => {
            let record: ScoreRecord =
                serde_json::from_str(raw).map_err(|_| "score is not valid JSON")?;
            (record.score, record.level)
        }
        None => (0, DEFAULT_LEVEL),
    };

    let snapshot = ProgressSnapshot {
        cursor,
        answer_log,
        score,
        level,
    };
    snapshot
        .validate()
        .map_err(|_| "answer log length does not match cursor")?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn video() -> VideoId {
        VideoId::new("dQw4w9WgXcQ").unwrap()
    }

    fn record(n: usize) -> AnswerRecord {
        AnswerRecord {
            question_text: format!("Q{n}"),
            user_answer_text: "a".into(),
            correct_answer_text: "a".into(),
            is_correct: true,
        }
    }

    fn store(repo: &InMemoryRepository) -> ProgressStore {
        ProgressStore::new(Arc::new(repo.clone()), fixed_clock())
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo);
        let log = vec![record(0), record(1)];

        progress.save(&video(), 2, &log).await.unwrap();
        progress.save_score(&video(), 310, 1).await.unwrap();

        let loaded = progress.load(&video()).await.unwrap().unwrap();
        assert_eq!(loaded.cursor, 2);
        assert_eq!(loaded.answer_log, log);
        assert_eq!(loaded.score, 310);
        assert_eq!(loaded.answer_log.len(), loaded.cursor);
    }

    #[tokio::test]
    async fn missing_progress_is_absent() {
        let repo = InMemoryRepository::new();
        assert!(store(&repo).load(&video()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_answer_log_resets_everything() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo);
        progress.save(&video(), 1, &[record(0)]).await.unwrap();
        repo.set("videoInteractiveAnswers:dQw4w9WgXcQ", "{not json")
            .await
            .unwrap();

        assert!(progress.load(&video()).await.unwrap().is_none());
        assert_eq!(repo.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn mismatched_cursor_is_treated_as_corrupt() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo);
        progress.save(&video(), 3, &[record(0)]).await.unwrap();

        assert!(progress.load(&video()).await.unwrap().is_none());
        assert_eq!(repo.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn per_video_keys_do_not_collide() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo);
        let other = VideoId::new("aaaaaaaaaaa").unwrap();

        progress.save(&video(), 1, &[record(0)]).await.unwrap();
        assert!(progress.load(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn global_scheme_shares_one_slot() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo).with_key_scheme(KeyScheme::Global);
        let other = VideoId::new("aaaaaaaaaaa").unwrap();

        progress.save(&video(), 1, &[record(0)]).await.unwrap();
        let loaded = progress.load(&other).await.unwrap().unwrap();
        assert_eq!(loaded.cursor, 1);
        assert_eq!(
            repo.get("videoInteractiveProgress").await.unwrap().as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn reset_clears_saved_state() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo);
        progress.save(&video(), 1, &[record(0)]).await.unwrap();
        progress.save_score(&video(), 150, 1).await.unwrap();

        progress.reset(&video()).await.unwrap();
        assert!(progress.load(&video()).await.unwrap().is_none());
        assert_eq!(repo.len().unwrap(), 0);
    }
}
