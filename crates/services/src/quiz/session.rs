use chem_core::model::Question;

use crate::error::QuizError;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Shape of a quiz run: how many questions are drawn and what each correct
/// answer is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    question_count: usize,
    points_per_question: u32,
}

impl QuizConfig {
    /// Creates a config, clamping both values to at least one.
    #[must_use]
    pub fn new(question_count: usize, points_per_question: u32) -> Self {
        Self {
            question_count: question_count.max(1),
            points_per_question: points_per_question.max(1),
        }
    }

    #[must_use]
    pub fn question_count(self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn points_per_question(self) -> u32 {
        self.points_per_question
    }

    /// Maximum score a run can reach.
    #[must_use]
    pub fn max_score(self) -> u32 {
        u32::try_from(self.question_count).unwrap_or(u32::MAX) * self.points_per_question
    }
}

impl Default for QuizConfig {
    /// Eight questions at four points each, for a maximum of 32.
    fn default() -> Self {
        Self::new(8, 4)
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Coarse session phase, for callers that only need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Clone)]
enum SessionState {
    NotStarted,
    InProgress(Play),
    Finished {
        correct_count: usize,
        final_score: u32,
        total: usize,
    },
}

#[derive(Debug, Clone)]
struct Play {
    questions: Vec<Question>,
    current: usize,
    selected: Option<usize>,
    correct_count: usize,
}

/// Outcome of selecting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The answer was recorded and is now locked in.
    Recorded { correct: bool },
    /// The question already has a locked-in answer; nothing changed.
    AlreadyAnswered,
}

/// Outcome of advancing past an answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAdvance {
    /// Moved to the question at `index`.
    Next { index: usize },
    /// That was the last question; the run is over.
    Finished { correct_count: usize, final_score: u32 },
}

/// Progress snapshot of a running or finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub answered: usize,
    pub total: usize,
    pub correct_count: usize,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One multiple-choice quiz run.
///
/// The first selection on each question is locked in; repeated selections
/// are acknowledged but change nothing. The running correct-counter is the
/// single source of the final score, computed when the last question is
/// advanced past as `correct_count * points_per_question`.
#[derive(Debug, Clone)]
pub struct QuizSession {
    config: QuizConfig,
    state: SessionState,
}

impl QuizSession {
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        Self {
            config,
            state: SessionState::NotStarted,
        }
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        match self.state {
            SessionState::NotStarted => QuizState::NotStarted,
            SessionState::InProgress(_) => QuizState::InProgress,
            SessionState::Finished { .. } => QuizState::Finished,
        }
    }

    /// Starts the run with an already-drawn question list.
    ///
    /// An empty list is accepted; the resulting run has no current question
    /// and can only be restarted with a fresh draw.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyStarted` if the session is running and
    /// `QuizError::Finished` if it already ended; call [`Self::restart`]
    /// first to begin a new run.
    pub fn begin(&mut self, questions: Vec<Question>) -> Result<(), QuizError> {
        match self.state {
            SessionState::NotStarted => {
                self.state = SessionState::InProgress(Play {
                    questions,
                    current: 0,
                    selected: None,
                    correct_count: 0,
                });
                Ok(())
            }
            SessionState::InProgress(_) => Err(QuizError::AlreadyStarted),
            SessionState::Finished { .. } => Err(QuizError::Finished),
        }
    }

    /// Discards the run and returns to `NotStarted`; the next
    /// [`Self::begin`] starts over with a fresh draw. Valid from any state.
    pub fn restart(&mut self) {
        self.state = SessionState::NotStarted;
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match &self.state {
            SessionState::InProgress(play) => play.questions.get(play.current),
            _ => None,
        }
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            SessionState::InProgress(play) if play.current < play.questions.len() => {
                Some(play.current)
            }
            _ => None,
        }
    }

    /// Index of the locked-in answer for the current question, if any.
    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        match &self.state {
            SessionState::InProgress(play) => play.selected,
            _ => None,
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        match &self.state {
            SessionState::NotStarted => 0,
            SessionState::InProgress(play) => play.questions.len(),
            SessionState::Finished { total, .. } => *total,
        }
    }

    /// Correct answers so far, or in total once finished.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        match &self.state {
            SessionState::NotStarted => 0,
            SessionState::InProgress(play) => play.correct_count,
            SessionState::Finished { correct_count, .. } => *correct_count,
        }
    }

    /// Final score, available once the run has finished.
    #[must_use]
    pub fn final_score(&self) -> Option<u32> {
        match &self.state {
            SessionState::Finished { final_score, .. } => Some(*final_score),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        match &self.state {
            SessionState::NotStarted => QuizProgress {
                answered: 0,
                total: 0,
                correct_count: 0,
            },
            SessionState::InProgress(play) => QuizProgress {
                answered: play.current,
                total: play.questions.len(),
                correct_count: play.correct_count,
            },
            SessionState::Finished {
                correct_count,
                total,
                ..
            } => QuizProgress {
                answered: *total,
                total: *total,
                correct_count: *correct_count,
            },
        }
    }

    /// Locks in an answer for the current question.
    ///
    /// The first selection is recorded and counted; any later selection on
    /// the same question returns `Selection::AlreadyAnswered` without
    /// touching the recorded one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotStarted` or `QuizError::Finished` outside a
    /// run, `QuizError::NoQuestion` if the run has no current question, and
    /// `QuizError::InvalidAnswer` if `index` is out of range.
    pub fn select_answer(&mut self, index: usize) -> Result<Selection, QuizError> {
        let play = match &mut self.state {
            SessionState::NotStarted => return Err(QuizError::NotStarted),
            SessionState::Finished { .. } => return Err(QuizError::Finished),
            SessionState::InProgress(play) => play,
        };

        let Some(question) = play.questions.get(play.current) else {
            return Err(QuizError::NoQuestion);
        };
        if index >= question.answers().len() {
            return Err(QuizError::InvalidAnswer(index));
        }
        if play.selected.is_some() {
            return Ok(Selection::AlreadyAnswered);
        }

        play.selected = Some(index);
        let correct = index == question.correct_index();
        if correct {
            play.correct_count += 1;
        }
        Ok(Selection::Recorded { correct })
    }

    /// Moves past the current (answered) question.
    ///
    /// Advancing past the last question finishes the run and fixes the
    /// final score.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotStarted` or `QuizError::Finished` outside a
    /// run, and `QuizError::AnswerRequired` if the current question has no
    /// locked-in answer.
    pub fn advance(&mut self) -> Result<SessionAdvance, QuizError> {
        let play = match &mut self.state {
            SessionState::NotStarted => return Err(QuizError::NotStarted),
            SessionState::Finished { .. } => return Err(QuizError::Finished),
            SessionState::InProgress(play) => play,
        };

        if play.selected.is_none() {
            return Err(QuizError::AnswerRequired);
        }

        play.current += 1;
        play.selected = None;

        if play.current < play.questions.len() {
            return Ok(SessionAdvance::Next { index: play.current });
        }

        let correct_count = play.correct_count;
        let total = play.questions.len();
        let final_score =
            u32::try_from(correct_count).unwrap_or(u32::MAX) * self.config.points_per_question();
        self.state = SessionState::Finished {
            correct_count,
            final_score,
            total,
        };
        Ok(SessionAdvance::Finished {
            correct_count,
            final_score,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
