use thiserror::Error;

use crate::model::ids::VideoId;
use crate::model::question::Question;
use crate::model::record::AnswerRecord;
use crate::model::schedule::QuestionSet;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("answer log has {log_len} entries but cursor is {cursor}")]
    LogMismatch { cursor: usize, log_len: usize },

    #[error("cursor {cursor} is past the {total} available questions")]
    CursorOutOfRange { cursor: usize, total: usize },

    #[error("all questions have already been answered")]
    Completed,
}

/// Persisted slice of a session: what survives a reload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub cursor: usize,
    pub answer_log: Vec<AnswerRecord>,
    pub score: i64,
    pub level: u32,
}

impl ProgressSnapshot {
    /// Validate that the log has one record per answered question.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::LogMismatch` if the lengths disagree.
    pub fn validate(&self) -> Result<(), SessionStateError> {
        if self.answer_log.len() == self.cursor {
            Ok(())
        } else {
            Err(SessionStateError::LogMismatch {
                cursor: self.cursor,
                log_len: self.answer_log.len(),
            })
        }
    }
}

/// Starting level; the quiz has a single level today.
pub const DEFAULT_LEVEL: u32 = 1;

/// All state of one quiz run over a video.
///
/// `cursor` indexes the next unanswered question and always equals the answer log
/// length. It only moves forward, except through [`SessionState::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    video_id: VideoId,
    questions: QuestionSet,
    cursor: usize,
    answer_log: Vec<AnswerRecord>,
    score: i64,
    level: u32,
}

impl SessionState {
    #[must_use]
    pub fn new(video_id: VideoId, questions: QuestionSet) -> Self {
        Self {
            video_id,
            questions,
            cursor: 0,
            answer_log: Vec::new(),
            score: 0,
            level: DEFAULT_LEVEL,
        }
    }

    /// Restore progress loaded from persistence.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if the snapshot is inconsistent or references
    /// more questions than this session holds. State is unchanged on error.
    pub fn restore(&mut self, snapshot: ProgressSnapshot) -> Result<(), SessionStateError> {
        snapshot.validate()?;
        if snapshot.cursor > self.questions.len() {
            return Err(SessionStateError::CursorOutOfRange {
                cursor: snapshot.cursor,
                total: self.questions.len(),
            });
        }
        self.cursor = snapshot.cursor;
        self.answer_log = snapshot.answer_log;
        self.score = snapshot.score;
        self.level = snapshot.level;
        Ok(())
    }

    /// Append the record for the current question, add `points`, and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Completed` if every question is answered.
    pub fn record_answer(
        &mut self,
        record: AnswerRecord,
        points: i64,
    ) -> Result<&AnswerRecord, SessionStateError> {
        if self.is_complete() {
            return Err(SessionStateError::Completed);
        }
        self.answer_log.push(record);
        self.score += points;
        self.cursor += 1;
        self.answer_log.last().ok_or(SessionStateError::Completed)
    }

    /// Back to the first question with an empty log and zero score.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.answer_log.clear();
        self.score = 0;
        self.level = DEFAULT_LEVEL;
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            cursor: self.cursor,
            answer_log: self.answer_log.clone(),
            score: self.score,
            level: self.level,
        }
    }

    #[must_use]
    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The next unanswered question, if any remain.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    /// The most recently answered question.
    #[must_use]
    pub fn last_answered(&self) -> Option<&Question> {
        self.cursor
            .checked_sub(1)
            .and_then(|idx| self.questions.get(idx))
    }

    #[must_use]
    pub fn answer_log(&self) -> &[AnswerRecord] {
        &self.answer_log
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Answer;

    fn questions(times: &[u32]) -> QuestionSet {
        let qs = times
            .iter()
            .map(|&t| {
                let answers = (0..4).map(|i| Answer::new(format!("A{i}"), i == 0)).collect();
                Question::new(format!("Q{t}"), answers, vec![], t, false).unwrap()
            })
            .collect();
        QuestionSet::new(qs).unwrap()
    }

    fn state() -> SessionState {
        SessionState::new(VideoId::new("dQw4w9WgXcQ").unwrap(), questions(&[10, 40]))
    }

    #[test]
    fn record_answer_keeps_log_in_step_with_cursor() {
        let mut s = state();
        let q = s.current_question().unwrap().clone();
        s.record_answer(AnswerRecord::for_choice(&q, 0).unwrap(), 150)
            .unwrap();
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.answer_log().len(), s.cursor());
        assert_eq!(s.score(), 150);
        assert_eq!(s.last_answered().unwrap().time(), 10);

        let q = s.current_question().unwrap().clone();
        s.record_answer(AnswerRecord::for_choice(&q, 1).unwrap(), 0)
            .unwrap();
        assert!(s.is_complete());
        let err = s
            .record_answer(AnswerRecord::for_choice(&q, 1).unwrap(), 0)
            .unwrap_err();
        assert_eq!(err, SessionStateError::Completed);
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn restore_rejects_inconsistent_snapshot() {
        let mut s = state();
        let err = s
            .restore(ProgressSnapshot {
                cursor: 1,
                ..ProgressSnapshot::default()
            })
            .unwrap_err();
        assert!(matches!(err, SessionStateError::LogMismatch { .. }));
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn restore_rejects_cursor_past_question_list() {
        let mut s = state();
        let record = AnswerRecord::for_choice(s.current_question().unwrap(), 0).unwrap();
        let snapshot = ProgressSnapshot {
            cursor: 3,
            answer_log: vec![record.clone(), record.clone(), record],
            score: 0,
            level: 1,
        };
        let err = s.restore(snapshot).unwrap_err();
        assert_eq!(
            err,
            SessionStateError::CursorOutOfRange {
                cursor: 3,
                total: 2
            }
        );
    }

    #[test]
    fn reset_returns_to_start() {
        let mut s = state();
        let q = s.current_question().unwrap().clone();
        s.record_answer(AnswerRecord::for_choice(&q, 0).unwrap(), 150)
            .unwrap();
        s.reset();
        assert_eq!(s.snapshot(), ProgressSnapshot {
            cursor: 0,
            answer_log: vec![],
            score: 0,
            level: DEFAULT_LEVEL
        });
    }
}
