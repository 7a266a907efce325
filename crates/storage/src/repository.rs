use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use chem_core::model::{HighScoreRecord, ModuleKey, Percent, ProgressRecord, Question, UserId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── PROGRESS DOCUMENT ─────────────────────────────────────────────────────────
//

/// Persisted shape of the per-user remote document.
///
/// One percent field per module plus quiz high-score fields and write
/// metadata. Every field is optional: a new user's document starts empty and
/// grows one field at a time through merge-writes. Unknown fields in a
/// stored document are ignored on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acid_base_progress: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titration_progress: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redox_progress: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonding_progress: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermochemistry_progress: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoichiometry_progress: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quiz_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_quiz_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_new_high_score: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProgressDocument {
    /// Returns the stored percent for `module`, if the field is defined.
    #[must_use]
    pub fn percent_for(&self, module: ModuleKey) -> Option<Percent> {
        match module {
            ModuleKey::AcidBase => self.acid_base_progress,
            ModuleKey::Titration => self.titration_progress,
            ModuleKey::Redox => self.redox_progress,
            ModuleKey::Bonding => self.bonding_progress,
            ModuleKey::Thermochemistry => self.thermochemistry_progress,
            ModuleKey::Stoichiometry => self.stoichiometry_progress,
        }
    }

    pub fn set_percent(&mut self, module: ModuleKey, percent: Percent) {
        let slot = match module {
            ModuleKey::AcidBase => &mut self.acid_base_progress,
            ModuleKey::Titration => &mut self.titration_progress,
            ModuleKey::Redox => &mut self.redox_progress,
            ModuleKey::Bonding => &mut self.bonding_progress,
            ModuleKey::Thermochemistry => &mut self.thermochemistry_progress,
            ModuleKey::Stoichiometry => &mut self.stoichiometry_progress,
        };
        *slot = Some(percent);
    }

    /// Applies a progress merge-write: the module's field plus metadata,
    /// nothing else.
    pub fn apply_progress(&mut self, record: &ProgressRecord, email: &str) {
        self.set_percent(record.module(), record.percent());
        self.email = Some(email.to_owned());
        self.last_updated = Some(record.last_updated());
    }

    /// Applies a high-score merge-write: score fields only.
    pub fn apply_high_score(&mut self, record: &HighScoreRecord) {
        self.max_quiz_score = Some(record.max_quiz_score());
        self.last_quiz_date = Some(record.last_quiz_date());
        self.has_new_high_score = Some(true);
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Remote per-user document store, keyed by user identifier.
///
/// Writes are merge-upserts: they update the named fields of the document
/// and preserve everything else, so module screens sharing one document
/// never clobber each other.
#[async_trait]
pub trait ProgressDocumentStore: Send + Sync {
    /// Point read of a user's document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached or the stored
    /// document cannot be decoded.
    async fn get_document(&self, user: &UserId) -> Result<Option<ProgressDocument>, StorageError>;

    /// Merge-upsert one module's percent, creating the document if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn merge_progress(
        &self,
        record: &ProgressRecord,
        email: &str,
    ) -> Result<(), StorageError>;

    /// Merge-upsert the quiz high-score fields, creating the document if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn merge_high_score(
        &self,
        user: &UserId,
        record: &HighScoreRecord,
    ) -> Result<(), StorageError>;
}

/// Read-only bulk access to the quiz question pool.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Fetch the whole pool; sessions draw a random subset from it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pool cannot be read or a stored
    /// question is malformed.
    async fn fetch_questions(&self) -> Result<Vec<Question>, StorageError>;
}

/// Local string-keyed cache, the fallback when no principal is present or a
/// remote read fails.
#[async_trait]
pub trait ProgressCache: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the cache cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the cache cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes all given keys; used to clear progress entries on logout.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cache cannot be written.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

/// Simple in-memory implementation of all three contracts, for testing and
/// prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    documents: Arc<Mutex<HashMap<UserId, ProgressDocument>>>,
    questions: Arc<Mutex<Vec<Question>>>,
    cache: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the question pool.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed_questions(&self, questions: Vec<Question>) {
        let mut guard = self.questions.lock().expect("question lock poisoned");
        *guard = questions;
    }
}

#[async_trait]
impl ProgressDocumentStore for InMemoryStorage {
    async fn get_document(&self, user: &UserId) -> Result<Option<ProgressDocument>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned())
    }

    async fn merge_progress(
        &self,
        record: &ProgressRecord,
        email: &str,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(record.user_id().clone())
            .or_default()
            .apply_progress(record, email);
        Ok(())
    }

    async fn merge_high_score(
        &self,
        user: &UserId,
        record: &HighScoreRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry(user.clone()).or_default().apply_high_score(record);
        Ok(())
    }
}

#[async_trait]
impl QuestionBank for InMemoryStorage {
    async fn fetch_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ProgressCache for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .cache
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .cache
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self
            .cache
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

/// Aggregates the three contracts behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub documents: Arc<dyn ProgressDocumentStore>,
    pub questions: Arc<dyn QuestionBank>,
    pub cache: Arc<dyn ProgressCache>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryStorage::new();
        let documents: Arc<dyn ProgressDocumentStore> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionBank> = Arc::new(repo.clone());
        let cache: Arc<dyn ProgressCache> = Arc::new(repo);
        Self {
            documents,
            questions,
            cache,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chem_core::model::Answer;
    use chem_core::time::fixed_now;

    fn percent(value: u8) -> Percent {
        Percent::new(value).unwrap()
    }

    #[tokio::test]
    async fn merge_progress_preserves_other_fields() {
        let repo = InMemoryStorage::new();
        let user = UserId::new("u1");

        let score = HighScoreRecord::new(user.clone(), 16, fixed_now());
        repo.merge_high_score(&user, &score).await.unwrap();

        let record = ProgressRecord::new(user.clone(), ModuleKey::Titration, percent(40), fixed_now());
        repo.merge_progress(&record, "u1@example.com").await.unwrap();

        let doc = repo.get_document(&user).await.unwrap().unwrap();
        assert_eq!(doc.titration_progress, Some(percent(40)));
        assert_eq!(doc.max_quiz_score, Some(16));
        assert_eq!(doc.email.as_deref(), Some("u1@example.com"));
        assert_eq!(doc.acid_base_progress, None);
    }

    #[tokio::test]
    async fn merge_high_score_sets_flag_and_keeps_percents() {
        let repo = InMemoryStorage::new();
        let user = UserId::new("u1");

        let record = ProgressRecord::new(user.clone(), ModuleKey::Redox, percent(70), fixed_now());
        repo.merge_progress(&record, "u1@example.com").await.unwrap();

        let score = HighScoreRecord::new(user.clone(), 28, fixed_now());
        repo.merge_high_score(&user, &score).await.unwrap();

        let doc = repo.get_document(&user).await.unwrap().unwrap();
        assert_eq!(doc.redox_progress, Some(percent(70)));
        assert_eq!(doc.max_quiz_score, Some(28));
        assert_eq!(doc.has_new_high_score, Some(true));
        assert_eq!(doc.last_quiz_date, Some(fixed_now()));
    }

    #[tokio::test]
    async fn cache_supports_get_set_remove() {
        let repo = InMemoryStorage::new();
        repo.set("acidBaseProgress", "55").await.unwrap();
        repo.set("redoxProgress", "30").await.unwrap();

        assert_eq!(
            repo.get("acidBaseProgress").await.unwrap().as_deref(),
            Some("55")
        );

        repo.remove_many(&["acidBaseProgress", "redoxProgress"])
            .await
            .unwrap();
        assert_eq!(repo.get("acidBaseProgress").await.unwrap(), None);
        assert_eq!(repo.get("redoxProgress").await.unwrap(), None);
    }

    #[tokio::test]
    async fn question_pool_round_trips() {
        let repo = InMemoryStorage::new();
        let question = Question::new(
            "Which solution has pH 7?",
            vec![Answer::new("HCl", false), Answer::new("H2O", true)],
            "Pure water is neutral.",
            "acid-base",
        )
        .unwrap();
        repo.seed_questions(vec![question.clone()]);

        let fetched = repo.fetch_questions().await.unwrap();
        assert_eq!(fetched, vec![question]);
    }

    #[test]
    fn document_serde_uses_wire_names_and_ignores_unknown_fields() {
        let mut doc = ProgressDocument::default();
        doc.set_percent(ModuleKey::AcidBase, percent(80));
        doc.max_quiz_score = Some(16);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["acidBaseProgress"], 80);
        assert_eq!(json["maxQuizScore"], 16);
        // Unset fields are omitted entirely rather than written as null.
        assert!(json.get("titrationProgress").is_none());

        let parsed: ProgressDocument = serde_json::from_str(
            r#"{"acidBaseProgress": 80, "maxQuizScore": 16, "someFutureField": "x"}"#,
        )
        .unwrap();
        assert_eq!(parsed.percent_for(ModuleKey::AcidBase), Some(percent(80)));
        assert_eq!(parsed.max_quiz_score, Some(16));
    }

    #[test]
    fn document_rejects_out_of_range_percent() {
        let err = serde_json::from_str::<ProgressDocument>(r#"{"acidBaseProgress": 130}"#);
        assert!(err.is_err());
    }
}
