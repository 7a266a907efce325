use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least two answers, got {0}")]
    TooFewAnswers(usize),

    #[error("question has no answer flagged correct")]
    NoCorrectAnswer,

    #[error("question has {0} answers flagged correct, expected exactly one")]
    MultipleCorrectAnswers(usize),
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// One answer choice of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    text: String,
    #[serde(rename = "correct")]
    is_correct: bool,
}

impl Answer {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice quiz question with a post-answer explanation.
///
/// Well-formedness (non-empty prompt, at least two answers, exactly one
/// correct) is checked at construction, so every `Question` reaching a quiz
/// session has a unique correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    answers: Vec<Answer>,
    explanation: String,
    category: String,
}

impl Question {
    /// Creates a new `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is empty, fewer than two answers
    /// are given, or the number of correct answers is not exactly one.
    pub fn new(
        prompt: impl Into<String>,
        answers: Vec<Answer>,
        explanation: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if answers.len() < 2 {
            return Err(QuestionError::TooFewAnswers(answers.len()));
        }
        let correct = answers.iter().filter(|answer| answer.is_correct()).count();
        match correct {
            0 => return Err(QuestionError::NoCorrectAnswer),
            1 => {}
            n => return Err(QuestionError::MultipleCorrectAnswers(n)),
        }

        Ok(Self {
            prompt: prompt.trim().to_owned(),
            answers,
            explanation: explanation.into(),
            category: category.into(),
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Explanation shown after answering, regardless of correctness.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Index of the single answer flagged correct.
    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.answers
            .iter()
            .position(Answer::is_correct)
            .unwrap_or_default()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(correct: usize, count: usize) -> Vec<Answer> {
        (0..count)
            .map(|i| Answer::new(format!("choice {i}"), i == correct))
            .collect()
    }

    #[test]
    fn question_happy_path() {
        let question = Question::new(
            "Which indicator turns pink in a strong base?",
            answers(2, 4),
            "Phenolphthalein turns pink above pH 8.3.",
            "acid-base",
        )
        .unwrap();

        assert_eq!(question.correct_index(), 2);
        assert_eq!(question.answers().len(), 4);
        assert_eq!(question.category(), "acid-base");
    }

    #[test]
    fn rejects_empty_prompt() {
        let err = Question::new("  ", answers(0, 4), "e", "c").unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn rejects_single_answer() {
        let err = Question::new("Q", vec![Answer::new("only", true)], "e", "c").unwrap_err();
        assert_eq!(err, QuestionError::TooFewAnswers(1));
    }

    #[test]
    fn rejects_missing_or_ambiguous_correct_flag() {
        let none = vec![Answer::new("a", false), Answer::new("b", false)];
        let err = Question::new("Q", none, "e", "c").unwrap_err();
        assert_eq!(err, QuestionError::NoCorrectAnswer);

        let both = vec![Answer::new("a", true), Answer::new("b", true)];
        let err = Question::new("Q", both, "e", "c").unwrap_err();
        assert_eq!(err, QuestionError::MultipleCorrectAnswers(2));
    }

    #[test]
    fn answer_serde_uses_wire_field_name() {
        let json = serde_json::to_string(&Answer::new("HCl", true)).unwrap();
        assert_eq!(json, r#"{"text":"HCl","correct":true}"#);
    }
}
