/// User-facing condition raised by the quiz, identified by its locale key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    SelectAnswerPrompt,
    TimeUp,
    CorrectFeedback,
    IncorrectFeedback,
    NoMoreHints,
    NoAnswersYet,
}

impl Notice {
    /// Key into the locale tables.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::SelectAnswerPrompt => "select_answer_prompt",
            Self::TimeUp => "time_up_message",
            Self::CorrectFeedback => "correct_feedback",
            Self::IncorrectFeedback => "incorrect_feedback",
            Self::NoMoreHints => "no_more_hints",
            Self::NoAnswersYet => "no_answers_yet",
        }
    }

    /// English fallback used when no locale table is loaded.
    #[must_use]
    pub fn fallback_text(self) -> &'static str {
        match self {
            Self::SelectAnswerPrompt => "Please select an answer.",
            Self::TimeUp => "Time is up!",
            Self::CorrectFeedback => "Correct!",
            Self::IncorrectFeedback => "Incorrect.",
            Self::NoMoreHints => "No more hints.",
            Self::NoAnswersYet => "No answers yet.",
        }
    }
}

/// Percentage of questions answered, as shown on the progress bar.
#[must_use]
pub fn progress_percent(cursor: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (cursor.min(total) * 100 + total / 2) / total;
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_and_handles_empty_lists() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(5, 5), 100);
    }

    #[test]
    fn keys_match_locale_tables() {
        assert_eq!(Notice::TimeUp.key(), "time_up_message");
        assert_eq!(Notice::SelectAnswerPrompt.key(), "select_answer_prompt");
    }
}
