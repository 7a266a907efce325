//! Quiz sessions: a fixed-length multiple-choice run with locked-in
//! answers, and the service that draws questions and reconciles high
//! scores.

mod service;
mod session;

pub use service::{HighScoreOutcome, QuizService, RunAdvance};
pub use session::{QuizConfig, QuizProgress, QuizSession, QuizState, Selection, SessionAdvance};
