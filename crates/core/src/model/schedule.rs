use serde::Serialize;
use serde_json::Value;

use crate::model::question::{Question, QuestionError};

/// Seconds at the end of a video where no question may fire.
pub const TAIL_RESERVE_SECS: u32 = 30;

/// Minimum number of questions requested from a generator.
pub const MIN_QUESTION_COUNT: u32 = 5;

/// Ordered, validated list of timed questions for one video.
///
/// Times are non-decreasing; the set may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

#[derive(Serialize)]
struct QuestionDocument<'a> {
    questions: &'a [Question],
}

impl QuestionSet {
    /// Wrap an already timed list of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OutOfOrder` if times decrease anywhere in the list.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        for (index, pair) in questions.windows(2).enumerate() {
            if pair[1].time() < pair[0].time() {
                return Err(QuestionError::OutOfOrder {
                    index: index + 1,
                    previous: pair[0].time(),
                    time: pair[1].time(),
                });
            }
        }
        Ok(Self { questions })
    }

    /// Reschedule questions evenly across a video of `duration_secs`, keeping the
    /// tail reserve free.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::UnknownDuration` when `duration_secs` is zero.
    pub fn distributed(questions: Vec<Question>, duration_secs: u32) -> Result<Self, QuestionError> {
        let questions = distribute(questions, duration_secs)?;
        Self::new(questions)
    }

    /// Parse a `{ "questions": [...] }` document with the times it carries.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::MalformedDocument` if the JSON is unreadable or
    /// `questions` is not an array, or any validation error of the questions.
    pub fn from_json(raw: &str) -> Result<Self, QuestionError> {
        Self::new(parse_question_document(raw)?)
    }

    /// Serialize to the `{ "questions": [...] }` document shape.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::MalformedDocument` if serialization fails.
    pub fn to_json(&self) -> Result<String, QuestionError> {
        serde_json::to_string(&QuestionDocument {
            questions: &self.questions,
        })
        .map_err(|err| QuestionError::MalformedDocument(err.to_string()))
    }

    /// Verify every question leaves the tail reserve free.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TooCloseToEnd` for the first offending question.
    pub fn check_tail(&self, duration_secs: u32) -> Result<(), QuestionError> {
        let limit = duration_secs.saturating_sub(TAIL_RESERVE_SECS);
        match self
            .questions
            .iter()
            .enumerate()
            .find(|(_, q)| q.time() > limit)
        {
            Some((index, q)) => Err(QuestionError::TooCloseToEnd {
                index,
                time: q.time(),
                limit,
            }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

/// Number of questions to request for a video: one per started minute, at least
/// [`MIN_QUESTION_COUNT`].
#[must_use]
pub fn target_question_count(duration_secs: u32) -> u32 {
    duration_secs.div_ceil(60).max(MIN_QUESTION_COUNT)
}

/// Spread questions one interval apart, clamped so none fires inside the tail reserve.
///
/// # Errors
///
/// Returns `QuestionError::UnknownDuration` when `duration_secs` is zero.
pub fn distribute(
    questions: Vec<Question>,
    duration_secs: u32,
) -> Result<Vec<Question>, QuestionError> {
    if duration_secs == 0 {
        return Err(QuestionError::UnknownDuration);
    }
    let minutes = duration_secs.div_ceil(60);
    let interval = duration_secs / minutes;
    let limit = duration_secs.saturating_sub(TAIL_RESERVE_SECS);

    Ok(questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            let slot = u32::try_from(index + 1).unwrap_or(u32::MAX);
            question.with_time(interval.saturating_mul(slot).min(limit))
        })
        .collect())
}

/// Extract the question list from a generated or cached JSON document.
///
/// Markdown code fences around the document are tolerated.
///
/// # Errors
///
/// Returns `QuestionError::MalformedDocument` if the JSON cannot be parsed or
/// `questions` is missing or not an array; validation errors of individual
/// questions are reported as malformed too.
pub fn parse_question_document(raw: &str) -> Result<Vec<Question>, QuestionError> {
    let body = strip_code_fence(raw);
    let mut value: Value = serde_json::from_str(body)
        .map_err(|err| QuestionError::MalformedDocument(err.to_string()))?;

    let questions = match value.get_mut("questions").map(Value::take) {
        Some(list @ Value::Array(_)) => list,
        Some(_) => {
            return Err(QuestionError::MalformedDocument(
                "`questions` must be an array".into(),
            ));
        }
        None => {
            return Err(QuestionError::MalformedDocument(
                "missing `questions` array".into(),
            ));
        }
    };

    serde_json::from_value(questions)
        .map_err(|err| QuestionError::MalformedDocument(err.to_string()))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Answer;

    fn question(time: u32) -> Question {
        let answers = (0..4).map(|i| Answer::new(format!("A{i}"), i == 0)).collect();
        Question::new(format!("Q at {time}"), answers, vec![], time, false).unwrap()
    }

    #[test]
    fn new_rejects_decreasing_times() {
        let err = QuestionSet::new(vec![question(40), question(10)]).unwrap_err();
        assert_eq!(
            err,
            QuestionError::OutOfOrder {
                index: 1,
                previous: 40,
                time: 10
            }
        );
    }

    #[test]
    fn distribution_reserves_thirty_second_tail() {
        let set = QuestionSet::distributed(vec![question(10), question(40)], 70).unwrap();
        let times: Vec<u32> = set.iter().map(Question::time).collect();
        assert_eq!(times, vec![35, 40]);
        set.check_tail(70).unwrap();
    }

    #[test]
    fn distribution_spaces_one_question_per_minute() {
        let qs = (0..5).map(|_| question(0)).collect();
        let set = QuestionSet::distributed(qs, 300).unwrap();
        let times: Vec<u32> = set.iter().map(Question::time).collect();
        assert_eq!(times, vec![60, 120, 180, 240, 270]);
    }

    #[test]
    fn distribution_requires_known_duration() {
        let err = QuestionSet::distributed(vec![question(0)], 0).unwrap_err();
        assert_eq!(err, QuestionError::UnknownDuration);
    }

    #[test]
    fn check_tail_flags_late_question() {
        let set = QuestionSet::new(vec![question(10), question(45)]).unwrap();
        let err = set.check_tail(70).unwrap_err();
        assert_eq!(
            err,
            QuestionError::TooCloseToEnd {
                index: 1,
                time: 45,
                limit: 40
            }
        );
    }

    #[test]
    fn target_count_is_one_per_minute_with_floor() {
        assert_eq!(target_question_count(0), 5);
        assert_eq!(target_question_count(61), 5);
        assert_eq!(target_question_count(601), 11);
    }

    #[test]
    fn non_array_questions_is_malformed() {
        let err = parse_question_document(r#"{"questions": {"a": 1}}"#).unwrap_err();
        assert!(matches!(err, QuestionError::MalformedDocument(_)));
        let err = parse_question_document("not json").unwrap_err();
        assert!(matches!(err, QuestionError::MalformedDocument(_)));
    }

    #[test]
    fn document_round_trips_and_tolerates_fences() {
        let set = QuestionSet::new(vec![question(10), question(40)]).unwrap();
        let json = set.to_json().unwrap();
        let fenced = format!("```json\n{json}\n```");
        assert_eq!(QuestionSet::from_json(&fenced).unwrap(), set);
    }
}
