use std::sync::Arc;

use rand::seq::SliceRandom;

use chem_core::model::{HighScoreRecord, Principal, Question};
use storage::repository::{ProgressDocumentStore, QuestionBank};

use crate::Clock;

use super::session::{QuizConfig, QuizSession, SessionAdvance};

//
// ─── HIGH SCORE OUTCOME ────────────────────────────────────────────────────────
//

/// What happened to a finished run's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighScoreOutcome {
    /// The score beat the stored maximum and was persisted.
    NewHighScore { score: u32 },
    /// The stored maximum is at least as good; nothing was written.
    Unchanged { best: u32 },
    /// No principal, or the store could not be reached; the run counts for
    /// nothing persistent.
    NotSaved,
}

/// Outcome of advancing a run through the service: like the session's own
/// advance, but a finished run also carries the high-score reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAdvance {
    Next {
        index: usize,
    },
    Finished {
        correct_count: usize,
        final_score: u32,
        high_score: HighScoreOutcome,
    },
}

//
// ─── QUIZ SERVICE ──────────────────────────────────────────────────────────────
//

/// Draws question sets for quiz runs and reconciles finished scores against
/// the stored per-user maximum.
pub struct QuizService {
    clock: Clock,
    config: QuizConfig,
    questions: Arc<dyn QuestionBank>,
    documents: Arc<dyn ProgressDocumentStore>,
    principal: Option<Principal>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionBank>,
        documents: Arc<dyn ProgressDocumentStore>,
        principal: Option<Principal>,
    ) -> Self {
        Self {
            clock,
            config: QuizConfig::default(),
            questions,
            documents,
            principal,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    /// A fresh, not-yet-started session with this service's config.
    #[must_use]
    pub fn new_session(&self) -> QuizSession {
        QuizSession::new(self.config)
    }

    /// Draws questions and starts the session. Returns the draw size, which
    /// is below the configured count when the pool is small, and zero when
    /// the pool is empty or unreachable.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the session cannot be started from its
    /// current state.
    pub async fn start(&self, session: &mut QuizSession) -> Result<usize, crate::QuizError> {
        let draw = self.draw().await;
        let count = draw.len();
        session.begin(draw)?;
        Ok(count)
    }

    /// Resets the session to `NotStarted`, then starts it with a fresh,
    /// independent draw.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the reset session cannot be started.
    pub async fn restart(&self, session: &mut QuizSession) -> Result<usize, crate::QuizError> {
        session.restart();
        self.start(session).await
    }

    async fn draw(&self) -> Vec<Question> {
        let mut pool = match self.questions.fetch_questions().await {
            Ok(pool) => pool,
            Err(err) => {
                log::warn!("question pool fetch failed, starting with no questions: {err}");
                Vec::new()
            }
        };
        pool.shuffle(&mut rand::rng());
        pool.truncate(self.config.question_count());
        pool
    }

    /// Moves the session past its current answered question; finishing the
    /// run reconciles the score against the stored maximum in one step.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` when the session cannot advance from its
    /// current state.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<RunAdvance, crate::QuizError> {
        match session.advance()? {
            SessionAdvance::Next { index } => Ok(RunAdvance::Next { index }),
            SessionAdvance::Finished {
                correct_count,
                final_score,
            } => {
                let high_score = self.reconcile_high_score(final_score).await;
                Ok(RunAdvance::Finished {
                    correct_count,
                    final_score,
                    high_score,
                })
            }
        }
    }

    /// Stored best score for the current principal, zero when signed out or
    /// when the store cannot be reached.
    pub async fn high_score(&self) -> u32 {
        let Some(principal) = &self.principal else {
            return 0;
        };
        match self.documents.get_document(principal.id()).await {
            Ok(Some(document)) => document.max_quiz_score.unwrap_or(0),
            Ok(None) => 0,
            Err(err) => {
                log::warn!("high score read failed: {err}");
                0
            }
        }
    }

    /// Compares a finished run's score against the stored maximum and
    /// persists it when strictly greater.
    ///
    /// A tie keeps the stored value, and an existing document without a
    /// stored score counts as zero. A user without any document gets one,
    /// even for a zero score, so the first run always establishes a
    /// baseline. Store failures are logged and reported as
    /// `HighScoreOutcome::NotSaved`.
    pub async fn reconcile_high_score(&self, final_score: u32) -> HighScoreOutcome {
        let Some(principal) = &self.principal else {
            return HighScoreOutcome::NotSaved;
        };

        let stored = match self.documents.get_document(principal.id()).await {
            Ok(document) => document,
            Err(err) => {
                log::warn!("high score read failed, dropping score {final_score}: {err}");
                return HighScoreOutcome::NotSaved;
            }
        };

        if let Some(document) = &stored {
            let best = document.max_quiz_score.unwrap_or(0);
            if final_score <= best {
                return HighScoreOutcome::Unchanged { best };
            }
        }

        let record = HighScoreRecord::new(principal.id().clone(), final_score, self.clock.now());
        match self
            .documents
            .merge_high_score(principal.id(), &record)
            .await
        {
            Ok(()) => HighScoreOutcome::NewHighScore { score: final_score },
            Err(err) => {
                log::warn!("high score write failed, dropping score {final_score}: {err}");
                HighScoreOutcome::NotSaved
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
