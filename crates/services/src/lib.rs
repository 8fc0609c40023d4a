#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod generation;
pub mod monitor;
pub mod player;
pub mod progress;
pub mod question_session;
pub mod question_store;
pub mod review;
pub mod settings;

pub use quiz_core::Clock;

pub use engine::{NextStep, QuizEngine, QuizEvent, QuizPhase, ResumeOutcome, SubmitOutcome};
pub use error::{GenerationError, ProgressError, QuizError, SettingsError};
pub use generation::{AiConfig, OpenAiQuestionSource, QuestionSource, YouTubeConfig};
pub use monitor::TimingMonitor;
pub use player::{PlaybackController, SimulatedPlayer};
pub use progress::{KeyScheme, ProgressStore};
pub use question_session::{ActiveQuestionContext, DisplayedAnswer, QuestionSession};
pub use question_store::{QuestionCache, QuestionProvider};
pub use review::{ReviewBuilder, ReviewItem};
pub use settings::{ApiKeySettings, ApiKeys};
