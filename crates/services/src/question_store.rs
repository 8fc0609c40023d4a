use std::sync::Arc;

use quiz_core::model::{QuestionSet, VideoId};
use storage::repository::{KeyValueStore, StorageError};

use crate::error::GenerationError;
use crate::generation::QuestionSource;

/// Generated question sets kept in the key-value store, one entry per video.
#[derive(Clone)]
pub struct QuestionCache {
    kv: Arc<dyn KeyValueStore>,
}

impl QuestionCache {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn key(video_id: &VideoId) -> String {
        format!("questions_{video_id}")
    }

    /// Cached questions for `video_id`. Unreadable entries count as a miss.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn load(&self, video_id: &VideoId) -> Result<Option<QuestionSet>, StorageError> {
        let Some(raw) = self.kv.get(&Self::key(video_id)).await? else {
            return Ok(None);
        };
        match QuestionSet::from_json(&raw) {
            Ok(set) => Ok(Some(set)),
            Err(err) => {
                tracing::warn!(%video_id, %err, "ignoring unreadable cached questions");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `GenerationError` if the set cannot be serialized or stored.
    pub async fn save(&self, video_id: &VideoId, questions: &QuestionSet) -> Result<(), GenerationError> {
        let raw = questions.to_json()?;
        self.kv.set(&Self::key(video_id), &raw).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub async fn clear(&self, video_id: &VideoId) -> Result<(), StorageError> {
        self.kv.remove(&Self::key(video_id)).await
    }
}

/// Cache-first access to question sets, generating on a miss.
pub struct QuestionProvider<S: QuestionSource> {
    cache: QuestionCache,
    source: S,
}

impl<S: QuestionSource> QuestionProvider<S> {
    #[must_use]
    pub fn new(cache: QuestionCache, source: S) -> Self {
        Self { cache, source }
    }

    /// Questions for `video_id`, from cache or freshly generated.
    ///
    /// A failure to write the cache is logged; the generated set is still returned.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the cache cannot be read or generation fails.
    pub async fn questions_for(
        &self,
        video_id: &VideoId,
        title: &str,
        description: &str,
    ) -> Result<QuestionSet, GenerationError> {
        if let Some(cached) = self.cache.load(video_id).await? {
            tracing::debug!(%video_id, questions = cached.len(), "using cached questions");
            return Ok(cached);
        }

        let generated = self.source.generate(video_id, title, description).await?;
        if let Err(err) = self.cache.save(video_id, &generated).await {
            tracing::warn!(%video_id, %err, "failed to cache generated questions");
        }
        Ok(generated)
    }
}
