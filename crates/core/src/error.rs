use thiserror::Error;

use crate::model::{DurationError, QuestionError, SessionStateError, VideoIdError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    VideoId(#[from] VideoIdError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
}
