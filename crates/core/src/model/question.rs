use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Number of answer options every question carries.
pub const ANSWERS_PER_QUESTION: usize = 4;

/// Maximum number of hints revealable per question, shared between manual and
/// timeout-triggered reveals.
pub const HINT_CEILING: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must have {ANSWERS_PER_QUESTION} answers, got {count}")]
    AnswerCount { count: usize },

    #[error("question must have exactly one correct answer, got {count}")]
    CorrectCount { count: usize },

    #[error("question times must be non-decreasing (index {index}: {time}s after {previous}s)")]
    OutOfOrder {
        index: usize,
        previous: u32,
        time: u32,
    },

    #[error("question at index {index} fires at {time}s, past the last allowed {limit}s")]
    TooCloseToEnd { index: usize, time: u32, limit: u32 },

    #[error("video duration is unknown")]
    UnknownDuration,

    #[error("question document is malformed: {0}")]
    MalformedDocument(String),
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// One multiple-choice option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

impl Answer {
    #[must_use]
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question scheduled at `time` seconds into the video.
///
/// Always holds exactly [`ANSWERS_PER_QUESTION`] answers, one of them correct, and at
/// most [`HINT_CEILING`] hints. Deserialization goes through the same validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    #[serde(rename = "question")]
    text: String,
    time: u32,
    answers: Vec<Answer>,
    hints: Vec<String>,
    #[serde(rename = "randomize")]
    randomize_answers: bool,
}

impl Question {
    /// Build a validated question.
    ///
    /// Hints past the ceiling are dropped.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, the answer count is not four,
    /// or there is not exactly one correct answer.
    pub fn new(
        text: impl Into<String>,
        answers: Vec<Answer>,
        mut hints: Vec<String>,
        time: u32,
        randomize_answers: bool,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if answers.len() != ANSWERS_PER_QUESTION {
            return Err(QuestionError::AnswerCount {
                count: answers.len(),
            });
        }
        let correct = answers.iter().filter(|a| a.correct).count();
        if correct != 1 {
            return Err(QuestionError::CorrectCount { count: correct });
        }
        hints.truncate(HINT_CEILING);

        Ok(Self {
            text,
            time,
            answers,
            hints,
            randomize_answers,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Seconds into the video at which this question fires.
    #[must_use]
    pub fn time(&self) -> u32 {
        self.time
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    #[must_use]
    pub fn randomize_answers(&self) -> bool {
        self.randomize_answers
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.answers
            .iter()
            .position(|a| a.correct)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &Answer {
        &self.answers[self.correct_index()]
    }

    /// Returns a copy of this question rescheduled at `time`.
    #[must_use]
    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }
}

#[derive(Deserialize)]
struct RawQuestion {
    #[serde(rename = "question", alias = "text")]
    text: String,
    #[serde(default, deserialize_with = "seconds")]
    time: u32,
    answers: Vec<Answer>,
    #[serde(default)]
    hints: Vec<String>,
    #[serde(rename = "randomize", alias = "randomizeAnswers", default)]
    randomize_answers: bool,
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuestionError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        Self::new(
            raw.text,
            raw.answers,
            raw.hints,
            raw.time,
            raw.randomize_answers,
        )
    }
}

// Generated documents sometimes carry fractional seconds.
fn seconds<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 || raw > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!("invalid question time: {raw}")));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(raw.floor() as u32)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(correct: usize) -> Vec<Answer> {
        (0..4)
            .map(|i| Answer::new(format!("A{i}"), i == correct))
            .collect()
    }

    #[test]
    fn new_rejects_wrong_answer_count() {
        let err = Question::new("Q", answers(0)[..3].to_vec(), vec![], 0, false).unwrap_err();
        assert_eq!(err, QuestionError::AnswerCount { count: 3 });
    }

    #[test]
    fn new_rejects_multiple_correct_answers() {
        let mut opts = answers(0);
        opts[2].correct = true;
        let err = Question::new("Q", opts, vec![], 0, false).unwrap_err();
        assert_eq!(err, QuestionError::CorrectCount { count: 2 });
    }

    #[test]
    fn extra_hints_are_dropped() {
        let hints = vec!["h1".into(), "h2".into(), "h3".into()];
        let q = Question::new("Q", answers(1), hints, 5, false).unwrap();
        assert_eq!(q.hints().len(), HINT_CEILING);
        assert_eq!(q.correct_index(), 1);
        assert_eq!(q.correct_answer().text, "A1");
    }

    #[test]
    fn deserializes_original_wire_shape() {
        let json = r#"{
            "question": "What is shown?",
            "time": 42.7,
            "answers": [
                {"text": "a", "correct": false},
                {"text": "b", "correct": true},
                {"text": "c", "correct": false},
                {"text": "d"}
            ],
            "hints": ["first"],
            "randomize": true
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.text(), "What is shown?");
        assert_eq!(q.time(), 42);
        assert!(q.randomize_answers());
        assert_eq!(q.hints(), ["first".to_string()]);
    }

    #[test]
    fn deserialization_enforces_single_correct_answer() {
        let json = r#"{
            "question": "Q",
            "answers": [
                {"text": "a"}, {"text": "b"}, {"text": "c"}, {"text": "d"}
            ]
        }"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }
}
