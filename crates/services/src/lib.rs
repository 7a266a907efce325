#![forbid(unsafe_code)]

pub mod error;
pub mod progress;
pub mod quiz;

pub use chem_core::Clock;

pub use error::{ProgressServiceError, QuizError};
pub use progress::{
    FallbackReason, LoadedPercent, PendingWrites, PercentSource, ProgressService, RecordOutcome,
};
pub use quiz::{
    HighScoreOutcome, QuizConfig, QuizProgress, QuizService, QuizSession, QuizState, RunAdvance,
    Selection, SessionAdvance,
};
