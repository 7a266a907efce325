use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{ProgressDocument, ProgressDocumentStore, StorageError};
use chem_core::model::{HighScoreRecord, ProgressRecord, UserId};

use super::SqliteRepository;

impl SqliteRepository {
    /// Read-modify-write merge of a user document inside one transaction.
    ///
    /// SQLite has no partial JSON update we want to rely on, so merge
    /// semantics are implemented by decoding the stored document, applying
    /// the field updates, and writing it back whole.
    async fn merge_document<F>(&self, user: &UserId, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut ProgressDocument),
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let row = sqlx::query("SELECT document FROM user_documents WHERE user_id = ?1")
            .bind(user.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let mut document = match row {
            Some(row) => {
                let raw: String = row
                    .try_get("document")
                    .map_err(|err| StorageError::Serialization(err.to_string()))?;
                serde_json::from_str(&raw)
                    .map_err(|err| StorageError::Serialization(err.to_string()))?
            }
            None => ProgressDocument::default(),
        };

        apply(&mut document);

        let raw = serde_json::to_string(&document)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        sqlx::query(
            r"
            INSERT INTO user_documents (user_id, document)
            VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET document = excluded.document
            ",
        )
        .bind(user.as_str())
        .bind(raw)
        .execute(&mut *tx)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tx.commit()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProgressDocumentStore for SqliteRepository {
    async fn get_document(&self, user: &UserId) -> Result<Option<ProgressDocument>, StorageError> {
        let row = sqlx::query("SELECT document FROM user_documents WHERE user_id = ?1")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("document")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn merge_progress(
        &self,
        record: &ProgressRecord,
        email: &str,
    ) -> Result<(), StorageError> {
        self.merge_document(record.user_id(), |document| {
            document.apply_progress(record, email);
        })
        .await
    }

    async fn merge_high_score(
        &self,
        user: &UserId,
        record: &HighScoreRecord,
    ) -> Result<(), StorageError> {
        self.merge_document(user, |document| {
            document.apply_high_score(record);
        })
        .await
    }
}
