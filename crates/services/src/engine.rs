use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use quiz_core::model::{
    AnswerRecord, PlayerErrorKind, PlayerEvent, Question, QuestionSet, SessionState, VideoId,
    progress_percent,
};

use crate::error::QuizError;
use crate::monitor::TimingMonitor;
use crate::player::PlaybackController;
use crate::progress::ProgressStore;
use crate::question_session::{
    ActiveQuestionContext, CountdownEvent, DisplayedAnswer, QuestionSession, Submission,
};
use crate::review::{ReviewBuilder, ReviewItem};

//
// ─── EVENTS & OUTCOMES ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Video playing or paused, no question on screen.
    Watching,
    /// A question is on screen and playback is paused.
    Question,
    /// The review is showing.
    Review,
    /// The player reported an error; the session is over.
    Failed(PlayerErrorKind),
}

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    QuestionActivated {
        index: usize,
        question: String,
        answers: Vec<DisplayedAnswer>,
    },
    CountdownTick {
        remaining_secs: u32,
    },
    TimeUp {
        hint: Option<String>,
    },
    ReviewReady(Vec<ReviewItem>),
    PlayerFailed(PlayerErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Playback resumed; polling for the next question.
    Resume,
    /// That was the last question.
    Review(Vec<ReviewItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Re-prompt; nothing changed.
    NoAnswerSelected,
    Resolved {
        record: AnswerRecord,
        points: i64,
        score: i64,
        next: NextStep,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// No usable saved progress; starting from the first question.
    Fresh,
    /// Saved progress restored and playback moved to the last answered question.
    Resumed { cursor: usize, seek_to: u32 },
    /// Every question was already answered.
    Completed(Vec<ReviewItem>),
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Owns one quiz run over a video and drives it from player events and elapsed
/// time.
///
/// Single-threaded and cooperative: the caller feeds [`PlayerEvent`]s through
/// [`QuizEngine::handle_player_event`] and elapsed time through
/// [`QuizEngine::advance`], which runs the position poll and the question countdown.
pub struct QuizEngine<P: PlaybackController> {
    state: SessionState,
    player: P,
    monitor: TimingMonitor,
    session: QuestionSession,
    progress: ProgressStore,
    rng: StdRng,
    phase: QuizPhase,
}

impl<P: PlaybackController> QuizEngine<P> {
    #[must_use]
    pub fn new(video_id: VideoId, questions: QuestionSet, player: P, progress: ProgressStore) -> Self {
        Self {
            state: SessionState::new(video_id, questions),
            player,
            monitor: TimingMonitor::new(),
            session: QuestionSession::new(),
            progress,
            rng: StdRng::from_os_rng(),
            phase: QuizPhase::Watching,
        }
    }

    #[must_use]
    pub fn with_practice_mode(mut self, practice_mode: bool) -> Self {
        self.session = QuestionSession::new().with_practice_mode(practice_mode);
        self
    }

    /// Use a seeded generator for answer shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Restore saved progress for this video.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Progress` if the store cannot be read.
    pub async fn resume(&mut self) -> Result<ResumeOutcome, QuizError> {
        let video_id = self.state.video_id().clone();
        let Some(snapshot) = self.progress.load(&video_id).await? else {
            return Ok(ResumeOutcome::Fresh);
        };

        if let Err(err) = self.state.restore(snapshot) {
            tracing::warn!(%video_id, %err, "saved progress does not match the questions, resetting");
            self.progress.reset(&video_id).await?;
            return Ok(ResumeOutcome::Fresh);
        }

        if self.state.is_complete() && self.state.total_questions() > 0 {
            return Ok(ResumeOutcome::Completed(self.finish()));
        }

        let cursor = self.state.cursor();
        let seek_to = self.state.last_answered().map_or(0, Question::time);
        if cursor > 0 {
            self.player.seek_to(f64::from(seek_to));
        }
        tracing::info!(%video_id, cursor, seek_to, "progress resumed");
        Ok(ResumeOutcome::Resumed { cursor, seek_to })
    }

    /// Start playback and begin polling for the next question.
    pub fn start(&mut self) {
        if matches!(self.phase, QuizPhase::Failed(_)) {
            return;
        }
        self.player.play();
        self.monitor.on_playback_playing();
    }

    /// React to a state change reported by the player.
    pub fn handle_player_event(&mut self, event: PlayerEvent) -> Vec<QuizEvent> {
        match event {
            PlayerEvent::Playing => {
                if !matches!(self.phase, QuizPhase::Failed(_)) {
                    self.monitor.on_playback_playing();
                }
                Vec::new()
            }
            PlayerEvent::Paused => {
                self.monitor.on_playback_paused();
                Vec::new()
            }
            PlayerEvent::Ended => match self.phase {
                QuizPhase::Failed(_) => Vec::new(),
                _ => vec![QuizEvent::ReviewReady(self.finish())],
            },
            PlayerEvent::Error(code) => {
                let kind = PlayerErrorKind::from_code(code);
                self.session.abandon();
                self.monitor.stop();
                self.phase = QuizPhase::Failed(kind);
                tracing::warn!(code, %kind, "player failed, ending session");
                vec![QuizEvent::PlayerFailed(kind)]
            }
        }
    }

    /// Let `elapsed` time pass, firing poll and countdown ticks in time order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        let mut remaining = elapsed;
        loop {
            let next = [self.monitor.until_due(), self.session.until_due()]
                .into_iter()
                .flatten()
                .min();
            match next {
                Some(step) if step <= remaining => {
                    self.monitor.advance(step);
                    self.session.advance(step);
                    remaining -= step;
                    self.run_due(&mut events);
                }
                _ => {
                    self.monitor.advance(remaining);
                    self.session.advance(remaining);
                    break;
                }
            }
        }
        events
    }

    fn run_due(&mut self, events: &mut Vec<QuizEvent>) {
        if let Some(index) = self.monitor.run_due(&mut self.player, &self.state) {
            if let Some(question) = self.state.questions().get(index).cloned() {
                let ctx = self.session.activate(index, question, &mut self.rng);
                events.push(QuizEvent::QuestionActivated {
                    index,
                    question: ctx.question().text().to_owned(),
                    answers: ctx.displayed_answers().to_vec(),
                });
                self.phase = QuizPhase::Question;
                tracing::info!(index, "question activated");
            }
        }
        for event in self.session.run_due() {
            events.push(match event {
                CountdownEvent::Tick { remaining_secs } => QuizEvent::CountdownTick { remaining_secs },
                CountdownEvent::TimeUp { hint } => QuizEvent::TimeUp { hint },
            });
        }
    }

    /// Record a pending choice by the answer's original index.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` or `QuizError::InvalidAnswer`.
    pub fn select_answer(&mut self, original_index: usize) -> Result<(), QuizError> {
        self.session.select_answer(original_index)
    }

    /// Reveal the next hint of the active question, if any remain.
    pub fn show_hint(&mut self) -> Option<String> {
        self.session.show_hint()
    }

    /// Submit the pending choice, log it, and move on.
    ///
    /// Persistence failures are logged and do not undo the answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` if no question is showing.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, QuizError> {
        let resolved = match self.session.submit()? {
            Submission::NoAnswerSelected => return Ok(SubmitOutcome::NoAnswerSelected),
            Submission::Resolved(resolved) => resolved,
        };

        self.monitor.question_resolved();
        let previous_score = self.state.score();
        self.state
            .record_answer(resolved.record.clone(), resolved.points)?;
        self.persist(previous_score).await;
        tracing::info!(
            index = resolved.index,
            correct = resolved.record.is_correct,
            points = resolved.points,
            score = self.state.score(),
            "question resolved"
        );

        let next = if self.state.is_complete() {
            NextStep::Review(self.finish())
        } else {
            self.phase = QuizPhase::Watching;
            self.player.play();
            self.monitor.on_playback_playing();
            NextStep::Resume
        };

        Ok(SubmitOutcome::Resolved {
            record: resolved.record,
            points: resolved.points,
            score: self.state.score(),
            next,
        })
    }

    /// Start over: cancel timers, drop the active question, wipe saved progress
    /// and replay from the beginning.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Progress` if saved progress cannot be removed; the
    /// in-memory session is reset regardless.
    pub async fn reset(&mut self) -> Result<(), QuizError> {
        self.session.abandon();
        self.monitor.stop();
        self.state.reset();
        self.phase = QuizPhase::Watching;

        self.player.seek_to(0.0);
        self.player.play();
        self.monitor.on_playback_playing();

        self.progress.reset(self.state.video_id()).await?;
        Ok(())
    }

    /// Review of everything answered so far.
    #[must_use]
    pub fn review(&self) -> Vec<ReviewItem> {
        ReviewBuilder::build(self.state.answer_log(), self.state.total_questions())
    }

    fn finish(&mut self) -> Vec<ReviewItem> {
        self.session.abandon();
        self.monitor.stop();
        self.player.pause();
        self.phase = QuizPhase::Review;
        tracing::info!(
            answered = self.state.cursor(),
            total = self.state.total_questions(),
            score = self.state.score(),
            "quiz finished"
        );
        self.review()
    }

    /// Save score, then cursor and log. Saved data never pairs a cursor with a
    /// score from a different answer: a failed score write skips the progress
    /// write, and a failed progress write restores `previous_score`.
    async fn persist(&self, previous_score: i64) {
        let video_id = self.state.video_id();
        let level = self.state.level();
        if let Err(err) = self
            .progress
            .save_score(video_id, self.state.score(), level)
            .await
        {
            tracing::warn!(%video_id, %err, "failed to save score, keeping previous progress");
            return;
        }
        if let Err(err) = self
            .progress
            .save(video_id, self.state.cursor(), self.state.answer_log())
            .await
        {
            tracing::warn!(%video_id, %err, "failed to save progress, restoring previous score");
            if let Err(err) = self
                .progress
                .save_score(video_id, previous_score, level)
                .await
            {
                tracing::warn!(%video_id, %err, "failed to restore previous score");
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn active_question(&self) -> Option<&ActiveQuestionContext> {
        self.session.context()
    }

    #[must_use]
    pub fn is_question_active(&self) -> bool {
        self.monitor.is_question_active()
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.state.cursor(), self.state.total_questions())
    }

    #[must_use]
    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }
}
