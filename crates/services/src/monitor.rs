use std::time::Duration;

use quiz_core::PeriodicTimer;
use quiz_core::model::SessionState;
use quiz_core::time::POSITION_POLL_INTERVAL;

use crate::player::PlaybackController;

/// Decides when playback reaches the next unanswered question.
///
/// Polls the player every 500 ms while playing. At most one question is ever active:
/// activation pauses playback and cancels the poll, and only
/// [`TimingMonitor::on_playback_playing`] after resolution arms it again.
#[derive(Debug, Clone)]
pub struct TimingMonitor {
    poll: PeriodicTimer,
    question_active: bool,
}

impl Default for TimingMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            poll: PeriodicTimer::new(POSITION_POLL_INTERVAL),
            question_active: false,
        }
    }

    /// Playback started or resumed: (re)arm the poll unless a question is showing.
    ///
    /// Returns whether the poll is running afterwards.
    pub fn on_playback_playing(&mut self) -> bool {
        if self.question_active {
            return false;
        }
        self.poll.arm();
        true
    }

    /// Playback paused by the viewer: nothing to watch until it plays again.
    pub fn on_playback_paused(&mut self) {
        self.poll.cancel();
    }

    #[must_use]
    pub fn is_question_active(&self) -> bool {
        self.question_active
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll.is_armed()
    }

    #[must_use]
    pub fn until_due(&self) -> Option<Duration> {
        self.poll.until_due()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.poll.advance(delta);
    }

    /// Run every poll tick that has fallen due.
    ///
    /// Returns the index of the question to activate, if playback crossed its time.
    pub fn run_due<P: PlaybackController>(
        &mut self,
        player: &mut P,
        state: &SessionState,
    ) -> Option<usize> {
        while self.poll.take_tick() {
            if let Some(index) = self.check_position(player, state) {
                return Some(index);
            }
        }
        None
    }

    fn check_position<P: PlaybackController>(
        &mut self,
        player: &mut P,
        state: &SessionState,
    ) -> Option<usize> {
        if self.question_active {
            return None;
        }
        // Not ready yet: try again next tick.
        let position = player.current_time().filter(|t| t.is_finite())?;
        let next = state.current_question()?;
        if position < f64::from(next.time()) {
            return None;
        }

        player.pause();
        self.question_active = true;
        self.poll.cancel();
        tracing::debug!(
            index = state.cursor(),
            position,
            scheduled = next.time(),
            "question threshold crossed"
        );
        Some(state.cursor())
    }

    /// The active question was resolved; polling resumes on the next playing signal.
    pub fn question_resolved(&mut self) {
        self.question_active = false;
    }

    /// Cancel the poll and forget any active question (reset, video end, failure).
    pub fn stop(&mut self) {
        self.poll.cancel();
        self.question_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::SimulatedPlayer;
    use quiz_core::model::{Answer, Question, QuestionSet, VideoId};

    fn state(times: &[u32]) -> SessionState {
        let qs = times
            .iter()
            .map(|&t| {
                let answers = (0..4).map(|i| Answer::new(format!("A{i}"), i == 0)).collect();
                Question::new(format!("Q{t}"), answers, vec![], t, false).unwrap()
            })
            .collect();
        SessionState::new(
            VideoId::new("dQw4w9WgXcQ").unwrap(),
            QuestionSet::new(qs).unwrap(),
        )
    }

    fn playing_at(secs: f64) -> SimulatedPlayer {
        let mut player = SimulatedPlayer::new(70);
        player.seek_to(secs);
        player.play();
        player
    }

    #[test]
    fn activates_once_threshold_is_crossed() {
        let state = state(&[10, 40]);
        let mut monitor = TimingMonitor::new();
        let mut player = playing_at(9.6);
        monitor.on_playback_playing();

        monitor.advance(POSITION_POLL_INTERVAL);
        assert_eq!(monitor.run_due(&mut player, &state), None);

        player.advance(0.5);
        monitor.advance(POSITION_POLL_INTERVAL);
        assert_eq!(monitor.run_due(&mut player, &state), Some(0));
        assert!(monitor.is_question_active());
        assert!(!monitor.is_polling());
        assert!(!player.is_playing());
    }

    #[test]
    fn playing_signal_is_ignored_while_question_active() {
        let state = state(&[10]);
        let mut monitor = TimingMonitor::new();
        let mut player = playing_at(12.0);
        monitor.on_playback_playing();
        monitor.advance(POSITION_POLL_INTERVAL);
        assert_eq!(monitor.run_due(&mut player, &state), Some(0));

        for _ in 0..5 {
            assert!(!monitor.on_playback_playing());
            monitor.advance(POSITION_POLL_INTERVAL);
            assert_eq!(monitor.run_due(&mut player, &state), None);
        }
    }

    #[test]
    fn missing_position_skips_tick() {
        let state = state(&[0]);
        let mut monitor = TimingMonitor::new();
        let mut player = SimulatedPlayer::new(70).not_ready();
        monitor.on_playback_playing();
        monitor.advance(POSITION_POLL_INTERVAL);
        assert_eq!(monitor.run_due(&mut player, &state), None);
        assert!(monitor.is_polling());

        player.set_ready();
        monitor.advance(POSITION_POLL_INTERVAL);
        assert_eq!(monitor.run_due(&mut player, &state), Some(0));
    }

    #[test]
    fn end_of_list_never_activates() {
        let state = state(&[]);
        let mut monitor = TimingMonitor::new();
        let mut player = playing_at(60.0);
        monitor.on_playback_playing();
        monitor.advance(Duration::from_secs(5));
        assert_eq!(monitor.run_due(&mut player, &state), None);
        assert!(monitor.is_polling());
    }

    #[test]
    fn paused_playback_stops_polling() {
        let state = state(&[10]);
        let mut monitor = TimingMonitor::new();
        let mut player = playing_at(20.0);
        monitor.on_playback_playing();
        monitor.on_playback_paused();
        monitor.advance(Duration::from_secs(2));
        assert_eq!(monitor.run_due(&mut player, &state), None);
    }
}
