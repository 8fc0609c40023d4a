use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::PeriodicTimer;
use quiz_core::model::scoring::{QUESTION_TIME_LIMIT_SECS, correct_answer_points};
use quiz_core::model::{AnswerRecord, HINT_CEILING, Question};
use quiz_core::time::COUNTDOWN_INTERVAL;

use crate::error::QuizError;

//
// ─── ACTIVE QUESTION ───────────────────────────────────────────────────────────
//

/// One answer button, bound to the answer's position in the question itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedAnswer {
    pub original_index: usize,
    pub text: String,
}

/// Ephemeral state of the question on screen. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuestionContext {
    index: usize,
    question: Question,
    display: Vec<DisplayedAnswer>,
    hints_revealed: usize,
    time_remaining_secs: u32,
    selected: Option<usize>,
}

impl ActiveQuestionContext {
    /// Position of this question in the session's list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Answers in display order.
    #[must_use]
    pub fn displayed_answers(&self) -> &[DisplayedAnswer] {
        &self.display
    }

    #[must_use]
    pub fn hints_revealed(&self) -> usize {
        self.hints_revealed
    }

    /// Hints shown so far, in reveal order.
    #[must_use]
    pub fn revealed_hints(&self) -> &[String] {
        let hints = self.question.hints();
        &hints[..self.hints_revealed.min(hints.len())]
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        self.selected
    }

    /// Counts a reveal even when the question has no text for it.
    fn reveal_next_hint(&mut self) -> Option<String> {
        if self.hints_revealed >= HINT_CEILING {
            return None;
        }
        let hint = self.question.hints().get(self.hints_revealed).cloned();
        self.hints_revealed += 1;
        hint
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What one countdown tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { remaining_secs: u32 },
    /// The countdown hit zero; the question stays open. Carries the hint revealed
    /// automatically, if one was left.
    TimeUp { hint: Option<String> },
}

/// A submitted answer, scored and ready to be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnswer {
    pub index: usize,
    pub record: AnswerRecord,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing selected yet; the question stays open and nothing changed.
    NoAnswerSelected,
    Resolved(ResolvedAnswer),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Runs one question from display to resolution: countdown, hints, selection,
/// submission and scoring.
#[derive(Debug, Clone)]
pub struct QuestionSession {
    active: Option<ActiveQuestionContext>,
    countdown: PeriodicTimer,
    practice_mode: bool,
}

impl Default for QuestionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: None,
            countdown: PeriodicTimer::new(COUNTDOWN_INTERVAL),
            practice_mode: false,
        }
    }

    /// In practice mode questions have no countdown.
    #[must_use]
    pub fn with_practice_mode(mut self, practice_mode: bool) -> Self {
        self.practice_mode = practice_mode;
        self
    }

    /// Show `question`, replacing any previous context and restarting the countdown.
    pub fn activate<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        question: Question,
        rng: &mut R,
    ) -> &ActiveQuestionContext {
        let mut display: Vec<DisplayedAnswer> = question
            .answers()
            .iter()
            .enumerate()
            .map(|(original_index, answer)| DisplayedAnswer {
                original_index,
                text: answer.text.clone(),
            })
            .collect();
        if question.randomize_answers() {
            display.shuffle(rng);
        }

        self.countdown.cancel();
        if !self.practice_mode {
            self.countdown.arm();
        }

        self.active.insert(ActiveQuestionContext {
            index,
            question,
            display,
            hints_revealed: 0,
            time_remaining_secs: QUESTION_TIME_LIMIT_SECS,
            selected: None,
        })
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn context(&self) -> Option<&ActiveQuestionContext> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_armed()
    }

    #[must_use]
    pub fn until_due(&self) -> Option<Duration> {
        self.countdown.until_due()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.countdown.advance(delta);
    }

    /// Run every countdown tick that has fallen due.
    pub fn run_due(&mut self) -> Vec<CountdownEvent> {
        let mut events = Vec::new();
        while self.countdown.take_tick() {
            let Some(ctx) = self.active.as_mut() else {
                self.countdown.cancel();
                break;
            };
            ctx.time_remaining_secs = ctx.time_remaining_secs.saturating_sub(1);
            if ctx.time_remaining_secs == 0 {
                self.countdown.cancel();
                let hint = ctx.reveal_next_hint();
                tracing::debug!(index = ctx.index, hint = hint.is_some(), "question time up");
                events.push(CountdownEvent::TimeUp { hint });
            } else {
                events.push(CountdownEvent::Tick {
                    remaining_secs: ctx.time_remaining_secs,
                });
            }
        }
        events
    }

    /// Record a pending choice by the answer's original index, replacing any
    /// earlier one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` or `QuizError::InvalidAnswer`.
    pub fn select_answer(&mut self, original_index: usize) -> Result<(), QuizError> {
        let ctx = self.active.as_mut().ok_or(QuizError::NoActiveQuestion)?;
        let len = ctx.question.answers().len();
        if original_index >= len {
            return Err(QuizError::InvalidAnswer {
                index: original_index,
                len,
            });
        }
        ctx.selected = Some(original_index);
        Ok(())
    }

    /// Reveal the next hint.
    ///
    /// Every call below the ceiling costs a hint, including ones where the question
    /// has no text left (`None`, shown as "no more hints"). Without an active question
    /// or at the ceiling nothing changes.
    pub fn show_hint(&mut self) -> Option<String> {
        self.active.as_mut()?.reveal_next_hint()
    }

    /// Submit the pending choice and close the question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` if no question is showing.
    pub fn submit(&mut self) -> Result<Submission, QuizError> {
        let ctx = self.active.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        let Some(chosen) = ctx.selected else {
            return Ok(Submission::NoAnswerSelected);
        };
        let record = AnswerRecord::for_choice(&ctx.question, chosen).ok_or(
            QuizError::InvalidAnswer {
                index: chosen,
                len: ctx.question.answers().len(),
            },
        )?;
        let points = if record.is_correct {
            correct_answer_points(ctx.time_remaining_secs, ctx.hints_revealed)
        } else {
            0
        };
        let index = ctx.index;

        self.abandon();
        Ok(Submission::Resolved(ResolvedAnswer {
            index,
            record,
            points,
        }))
    }

    /// Drop the active question and stop the countdown.
    pub fn abandon(&mut self) {
        self.countdown.cancel();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Answer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(hints: &[&str], randomize: bool) -> Question {
        let answers = vec![
            Answer::new("wrong 0", false),
            Answer::new("right", true),
            Answer::new("wrong 2", false),
            Answer::new("wrong 3", false),
        ];
        let hints = hints.iter().map(|h| (*h).to_owned()).collect();
        Question::new("Q", answers, hints, 10, randomize).unwrap()
    }

    fn active(hints: &[&str]) -> QuestionSession {
        let mut session = QuestionSession::new();
        session.activate(0, question(hints, false), &mut StdRng::seed_from_u64(7));
        session
    }

    #[test]
    fn activation_resets_ephemeral_state() {
        let mut session = active(&["h1", "h2"]);
        session.select_answer(2).unwrap();
        session.show_hint();

        session.activate(1, question(&["h1"], false), &mut StdRng::seed_from_u64(7));
        let ctx = session.context().unwrap();
        assert_eq!(ctx.index(), 1);
        assert_eq!(ctx.hints_revealed(), 0);
        assert_eq!(ctx.selected_answer(), None);
        assert_eq!(ctx.time_remaining_secs(), QUESTION_TIME_LIMIT_SECS);
        assert!(session.is_counting_down());
    }

    #[test]
    fn hint_ceiling_allows_two_reveals() {
        let mut session = active(&["h1", "h2"]);
        assert_eq!(session.show_hint().as_deref(), Some("h1"));
        assert_eq!(session.show_hint().as_deref(), Some("h2"));
        assert_eq!(session.show_hint(), None);
        assert_eq!(session.context().unwrap().hints_revealed(), 2);
    }

    #[test]
    fn missing_hint_text_still_counts() {
        let mut session = active(&["only"]);
        assert_eq!(session.show_hint().as_deref(), Some("only"));
        assert_eq!(session.show_hint(), None);
        assert_eq!(session.context().unwrap().hints_revealed(), 2);
        assert_eq!(session.show_hint(), None);

        let ctx = session.context().unwrap();
        assert_eq!(ctx.hints_revealed(), 2);
        assert_eq!(ctx.revealed_hints(), ["only".to_string()]);
    }

    #[test]
    fn timeout_on_question_without_hints_costs_a_hint() {
        let mut session = active(&[]);
        session.advance(Duration::from_secs(30));
        let events = session.run_due();
        assert_eq!(events.last(), Some(&CountdownEvent::TimeUp { hint: None }));
        assert_eq!(session.context().unwrap().hints_revealed(), 1);

        session.select_answer(1).unwrap();
        let Submission::Resolved(resolved) = session.submit().unwrap() else {
            panic!("expected resolution");
        };
        assert_eq!(resolved.points, 100 - 20);
    }

    #[test]
    fn show_hint_without_question_is_noop() {
        let mut session = QuestionSession::new();
        assert_eq!(session.show_hint(), None);
    }

    #[test]
    fn randomized_display_keeps_original_indices() {
        let mut session = QuestionSession::new();
        let ctx = session.activate(0, question(&[], true), &mut StdRng::seed_from_u64(42));
        let mut indices: Vec<usize> = ctx
            .displayed_answers()
            .iter()
            .map(|d| d.original_index)
            .collect();
        for shown in ctx.displayed_answers() {
            assert_eq!(shown.text, ctx.question().answers()[shown.original_index].text);
        }
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn submit_without_selection_changes_nothing() {
        let mut session = active(&[]);
        assert_eq!(session.submit().unwrap(), Submission::NoAnswerSelected);
        assert!(session.is_active());
        assert!(session.is_counting_down());
    }

    #[test]
    fn reselecting_replaces_pending_choice() {
        let mut session = active(&[]);
        session.select_answer(0).unwrap();
        session.select_answer(1).unwrap();
        let Submission::Resolved(resolved) = session.submit().unwrap() else {
            panic!("expected resolution");
        };
        assert!(resolved.record.is_correct);
        assert_eq!(resolved.points, 160);
        assert!(!session.is_active());
        assert!(!session.is_counting_down());
    }

    #[test]
    fn select_rejects_out_of_range_index() {
        let mut session = active(&[]);
        let err = session.select_answer(4).unwrap_err();
        assert!(matches!(err, QuizError::InvalidAnswer { index: 4, len: 4 }));
    }

    #[test]
    fn wrong_answer_scores_nothing() {
        let mut session = active(&[]);
        session.select_answer(3).unwrap();
        let Submission::Resolved(resolved) = session.submit().unwrap() else {
            panic!("expected resolution");
        };
        assert!(!resolved.record.is_correct);
        assert_eq!(resolved.points, 0);
    }

    #[test]
    fn countdown_reveals_hint_on_timeout_and_stays_open() {
        let mut session = active(&["h1", "h2"]);
        session.advance(Duration::from_secs(5));
        let events = session.run_due();
        assert_eq!(events.len(), 5);
        assert_eq!(events[4], CountdownEvent::Tick { remaining_secs: 25 });

        session.advance(Duration::from_secs(60));
        let events = session.run_due();
        assert_eq!(
            events.last(),
            Some(&CountdownEvent::TimeUp {
                hint: Some("h1".into())
            })
        );
        assert!(!session.is_counting_down());

        assert_eq!(session.show_hint().as_deref(), Some("h2"));
        assert_eq!(session.show_hint(), None);

        session.select_answer(1).unwrap();
        let Submission::Resolved(resolved) = session.submit().unwrap() else {
            panic!("expected resolution");
        };
        assert_eq!(resolved.points, 100 - 40);
    }

    #[test]
    fn practice_mode_has_no_countdown() {
        let mut session = QuestionSession::new().with_practice_mode(true);
        session.activate(0, question(&[], false), &mut StdRng::seed_from_u64(1));
        session.advance(Duration::from_secs(60));
        assert!(session.run_due().is_empty());
        assert_eq!(
            session.context().unwrap().time_remaining_secs(),
            QUESTION_TIME_LIMIT_SECS
        );
    }
}
