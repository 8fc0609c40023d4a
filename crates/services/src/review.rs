use quiz_core::model::{AnswerRecord, Notice};

/// One entry of the end-of-quiz review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewItem {
    /// Shown alone when nothing was answered.
    NoAnswers { total_questions: usize },
    Answered {
        /// 1-based question number.
        number: usize,
        question: String,
        user_answer: String,
        correct_answer: String,
        is_correct: bool,
    },
}

impl ReviewItem {
    /// Feedback notice for the entry.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::NoAnswers { .. } => Notice::NoAnswersYet,
            Self::Answered {
                is_correct: true, ..
            } => Notice::CorrectFeedback,
            Self::Answered { .. } => Notice::IncorrectFeedback,
        }
    }
}

/// Builds the review list from an answer log. Pure; never touches storage.
pub struct ReviewBuilder;

impl ReviewBuilder {
    #[must_use]
    pub fn build(answer_log: &[AnswerRecord], total_questions: usize) -> Vec<ReviewItem> {
        if answer_log.is_empty() {
            return vec![ReviewItem::NoAnswers { total_questions }];
        }
        answer_log
            .iter()
            .enumerate()
            .map(|(idx, record)| ReviewItem::Answered {
                number: idx + 1,
                question: record.question_text.clone(),
                user_answer: record.user_answer_text.clone(),
                correct_answer: record.correct_answer_text.clone(),
                is_correct: record.is_correct,
            })
            .collect()
    }

    /// Number of correct entries in a log.
    #[must_use]
    pub fn correct_count(answer_log: &[AnswerRecord]) -> usize {
        answer_log.iter().filter(|r| r.is_correct).count()
    }
}
