use std::sync::Arc;

use async_trait::async_trait;

use chem_core::model::{
    HighScoreRecord, ModuleKey, Percent, Principal, ProgressRecord, UserId,
};
use chem_core::time::fixed_clock;
use services::progress::{FallbackReason, PercentSource, ProgressService, RecordOutcome};
use storage::repository::{
    InMemoryStorage, ProgressDocument, ProgressDocumentStore, StorageError,
};

/// Document store that always fails, standing in for an unreachable remote.
struct OfflineDocuments;

#[async_trait]
impl ProgressDocumentStore for OfflineDocuments {
    async fn get_document(&self, _user: &UserId) -> Result<Option<ProgressDocument>, StorageError> {
        Err(StorageError::Connection("remote offline".into()))
    }

    async fn merge_progress(
        &self,
        _record: &ProgressRecord,
        _email: &str,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("remote offline".into()))
    }

    async fn merge_high_score(
        &self,
        _user: &UserId,
        _record: &HighScoreRecord,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("remote offline".into()))
    }
}

fn percent(value: u8) -> Percent {
    Percent::new(value).unwrap()
}

fn principal() -> Principal {
    Principal::new(UserId::new("u1"), "u1@example.com")
}

#[tokio::test]
async fn remote_failure_falls_back_to_cached_value() {
    let cache = InMemoryStorage::new();
    {
        use storage::repository::ProgressCache;
        cache.set("acidBaseProgress", "45").await.unwrap();
    }

    let mut progress = ProgressService::new(
        fixed_clock(),
        Arc::new(OfflineDocuments),
        Arc::new(cache),
        Some(principal()),
    );

    let loaded = progress.load(ModuleKey::AcidBase).await;
    assert_eq!(loaded.percent(), percent(45));
    assert_eq!(loaded.source(), PercentSource::Cache);
    assert!(matches!(
        loaded.fallback(),
        Some(FallbackReason::RemoteUnavailable(_))
    ));
}

#[tokio::test]
async fn failed_sync_keeps_the_write_queued_and_cached() {
    let cache = InMemoryStorage::new();
    let mut progress = ProgressService::new(
        fixed_clock(),
        Arc::new(OfflineDocuments),
        Arc::new(cache.clone()),
        Some(principal()),
    );

    assert_eq!(
        progress.record(ModuleKey::Titration, percent(60)).await,
        RecordOutcome::Advanced
    );

    // The remote write failed, but nothing was rolled back.
    assert!(progress.has_pending());
    assert_eq!(progress.known_percent(ModuleKey::Titration), Some(percent(60)));
    {
        use storage::repository::ProgressCache;
        assert_eq!(
            cache.get("titrationProgress").await.unwrap().as_deref(),
            Some("60")
        );
    }

    // Reloading sees the cached value, not a regression to zero.
    let loaded = progress.load(ModuleKey::Titration).await;
    assert_eq!(loaded.percent(), percent(60));
    assert_eq!(loaded.source(), PercentSource::Cache);
}

#[tokio::test]
async fn recovered_remote_receives_the_coalesced_write() {
    let repo = InMemoryStorage::new();
    let mut progress = ProgressService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Some(principal()),
    );

    // Several observations in a row; only the largest should matter.
    progress.record(ModuleKey::Redox, percent(10)).await;
    progress.record(ModuleKey::Redox, percent(35)).await;
    progress.record(ModuleKey::Redox, percent(80)).await;
    progress.flush_pending().await;
    assert!(!progress.has_pending());

    let doc = repo
        .get_document(&UserId::new("u1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.redox_progress, Some(percent(80)));
}
