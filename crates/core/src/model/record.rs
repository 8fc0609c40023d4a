use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::question::Question;

/// Outcome of one answered question, kept for the review screen.
///
/// Serialized with the same keys the browser build wrote to local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    #[serde(rename = "question")]
    pub question_text: String,
    #[serde(rename = "userAnswer")]
    pub user_answer_text: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer_text: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

impl AnswerRecord {
    /// Record the answer at `chosen` (index into the question's own answer order).
    ///
    /// Returns `None` if `chosen` is out of range.
    #[must_use]
    pub fn for_choice(question: &Question, chosen: usize) -> Option<Self> {
        let answer = question.answers().get(chosen)?;
        Some(Self {
            question_text: question.text().to_owned(),
            user_answer_text: answer.text.clone(),
            correct_answer_text: question.correct_answer().text.clone(),
            is_correct: answer.correct,
        })
    }
}

/// Persisted score snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: i64,
    pub level: u32,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Answer;

    #[test]
    fn record_captures_chosen_and_correct_text() {
        let answers = vec![
            Answer::new("red", false),
            Answer::new("blue", true),
            Answer::new("green", false),
            Answer::new("pink", false),
        ];
        let q = Question::new("Sky colour?", answers, vec![], 10, false).unwrap();

        let wrong = AnswerRecord::for_choice(&q, 2).unwrap();
        assert_eq!(wrong.user_answer_text, "green");
        assert_eq!(wrong.correct_answer_text, "blue");
        assert!(!wrong.is_correct);

        assert!(AnswerRecord::for_choice(&q, 1).unwrap().is_correct);
        assert!(AnswerRecord::for_choice(&q, 4).is_none());
    }

    #[test]
    fn serializes_with_storage_keys() {
        let record = AnswerRecord {
            question_text: "Q".into(),
            user_answer_text: "a".into(),
            correct_answer_text: "b".into(),
            is_correct: false,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["userAnswer"], "a");
        assert_eq!(json["correctAnswer"], "b");
        assert_eq!(json["isCorrect"], false);
    }
}
