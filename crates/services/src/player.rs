use quiz_core::model::PlayerEvent;

/// The playback capabilities the quiz needs from a video player.
///
/// State changes travel the other way, as [`PlayerEvent`]s handed to
/// [`crate::QuizEngine::handle_player_event`].
pub trait PlaybackController {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);

    /// Current playback position, or `None` while the player is not ready.
    fn current_time(&self) -> Option<f64>;
}

/// Headless player that advances its position while playing.
///
/// State changes are queued and drained with [`SimulatedPlayer::drain_events`],
/// the way an embedded player reports them asynchronously.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    duration: f64,
    position: f64,
    playing: bool,
    ready: bool,
    ended: bool,
    events: Vec<PlayerEvent>,
}

impl SimulatedPlayer {
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration: f64::from(duration_secs),
            position: 0.0,
            playing: false,
            ready: true,
            ended: false,
            events: Vec::new(),
        }
    }

    /// Start in the "not ready" state; position reads return `None` until
    /// [`SimulatedPlayer::set_ready`] is called.
    #[must_use]
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn set_ready(&mut self) {
        self.ready = true;
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Move the playhead forward by `secs` if playing; reaching the end queues `Ended`.
    pub fn advance(&mut self, secs: f64) {
        if !self.playing {
            return;
        }
        self.position = (self.position + secs).min(self.duration);
        if self.position >= self.duration && !self.ended {
            self.playing = false;
            self.ended = true;
            self.events.push(PlayerEvent::Ended);
        }
    }

    /// Report a player failure.
    pub fn fail(&mut self, code: i32) {
        self.playing = false;
        self.events.push(PlayerEvent::Error(code));
    }

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl PlaybackController for SimulatedPlayer {
    fn play(&mut self) {
        if self.playing || self.position >= self.duration {
            return;
        }
        self.playing = true;
        self.events.push(PlayerEvent::Playing);
    }

    fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.events.push(PlayerEvent::Paused);
    }

    fn seek_to(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration);
        if self.position < self.duration {
            self.ended = false;
        }
    }

    fn current_time(&self) -> Option<f64> {
        self.ready.then_some(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_only_moves_while_playing() {
        let mut player = SimulatedPlayer::new(70);
        player.advance(5.0);
        assert_eq!(player.current_time(), Some(0.0));

        player.play();
        player.advance(5.0);
        assert_eq!(player.current_time(), Some(5.0));
        assert_eq!(player.drain_events(), vec![PlayerEvent::Playing]);
    }

    #[test]
    fn reaching_the_end_queues_ended_once() {
        let mut player = SimulatedPlayer::new(10);
        player.play();
        player.advance(8.0);
        player.advance(8.0);
        player.advance(8.0);
        assert_eq!(
            player.drain_events(),
            vec![PlayerEvent::Playing, PlayerEvent::Ended]
        );
        assert!(!player.is_playing());
    }

    #[test]
    fn not_ready_player_reports_no_position() {
        let mut player = SimulatedPlayer::new(10).not_ready();
        assert_eq!(player.current_time(), None);
        player.set_ready();
        assert_eq!(player.current_time(), Some(0.0));
    }
}
