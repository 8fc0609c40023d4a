mod duration;
mod ids;
mod notice;
mod player;
mod question;
mod record;
mod schedule;
pub mod scoring;
mod session;

pub use duration::{DurationError, parse_iso8601_duration};
pub use ids::{VIDEO_ID_LEN, VideoId, VideoIdError, extract_video_id};
pub use notice::{Notice, progress_percent};
pub use player::{PlayerErrorKind, PlayerEvent};
pub use question::{ANSWERS_PER_QUESTION, Answer, HINT_CEILING, Question, QuestionError};
pub use record::{AnswerRecord, ScoreRecord};
pub use schedule::{
    MIN_QUESTION_COUNT, QuestionSet, TAIL_RESERVE_SECS, distribute, parse_question_document,
    target_question_count,
};
pub use session::{DEFAULT_LEVEL, ProgressSnapshot, SessionState, SessionStateError};
