use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{QuestionBank, StorageError};
use chem_core::model::{Answer, Question};

use super::SqliteRepository;

impl SqliteRepository {
    /// Insert a question into the pool; used by the seed binary.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert or answer encoding fails.
    pub async fn insert_question(&self, question: &Question) -> Result<(), StorageError> {
        let answers = serde_json::to_string(question.answers())
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        sqlx::query(
            r"
            INSERT INTO questions (prompt, explanation, category, answers)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(question.prompt())
        .bind(question.explanation())
        .bind(question.category())
        .bind(answers)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl QuestionBank for SqliteRepository {
    async fn fetch_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query("SELECT prompt, explanation, category, answers FROM questions")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            let prompt: String = row
                .try_get("prompt")
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            let explanation: String = row
                .try_get("explanation")
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            let category: String = row
                .try_get("category")
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            let raw_answers: String = row
                .try_get("answers")
                .map_err(|err| StorageError::Serialization(err.to_string()))?;

            let answers: Vec<Answer> = serde_json::from_str(&raw_answers)
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            // Re-validate on the way out so a malformed row cannot reach a session.
            let question = Question::new(prompt, answers, explanation, category)
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            questions.push(question);
        }
        Ok(questions)
    }
}
