//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz session has not been started")]
    NotStarted,

    #[error("quiz session is already running")]
    AlreadyStarted,

    #[error("no question is available at the current position")]
    NoQuestion,

    #[error("current question must be answered before advancing")]
    AnswerRequired,

    #[error("answer index {0} is out of range")]
    InvalidAnswer(usize),

    #[error("quiz session is already finished")]
    Finished,
}
