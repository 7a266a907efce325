use std::collections::HashMap;
use std::sync::Arc;

use chem_core::model::{ModuleKey, Percent, Principal, ProgressRecord};
use storage::repository::{ProgressCache, ProgressDocumentStore};

use crate::Clock;
use crate::error::ProgressServiceError;

use super::outcome::{FallbackReason, LoadedPercent, PercentSource};
use super::pending::PendingWrites;

//
// ─── RECORD OUTCOME ────────────────────────────────────────────────────────────
//

/// What happened to an observed progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The value beat the best known percent and was persisted.
    Advanced,
    /// The value did not beat the best known percent; nothing was written.
    Ignored,
}

//
// ─── PROGRESS SERVICE ──────────────────────────────────────────────────────────
//

/// Tracks per-module completion percents for one user.
///
/// Reads prefer the remote per-user document and fall back to the local
/// cache, then to the best value known in-memory. Writes go through a
/// strictly-greater guard, land in the cache immediately, and are synced to
/// the remote document through a coalescing pending queue. Remote and cache
/// failures degrade to the next source instead of surfacing as errors.
pub struct ProgressService {
    clock: Clock,
    documents: Arc<dyn ProgressDocumentStore>,
    cache: Arc<dyn ProgressCache>,
    principal: Option<Principal>,
    known: HashMap<ModuleKey, Percent>,
    pending: PendingWrites,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        documents: Arc<dyn ProgressDocumentStore>,
        cache: Arc<dyn ProgressCache>,
        principal: Option<Principal>,
    ) -> Self {
        Self {
            clock,
            documents,
            cache,
            principal,
            known: HashMap::new(),
            pending: PendingWrites::new(),
        }
    }

    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Best percent seen for `module` so far, from any source.
    #[must_use]
    pub fn known_percent(&self, module: ModuleKey) -> Option<Percent> {
        self.known.get(&module).copied()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Loads the completion percent for one module.
    ///
    /// Tries the remote document first (when a principal is present), then
    /// the cache, then the best value known in-memory. A remote hit is
    /// copied into the cache so later offline loads see it.
    pub async fn load(&mut self, module: ModuleKey) -> LoadedPercent {
        let fallback = match &self.principal {
            None => FallbackReason::NoPrincipal,
            Some(principal) => match self.documents.get_document(principal.id()).await {
                Ok(Some(document)) => match document.percent_for(module) {
                    Some(percent) => {
                        self.known.insert(module, percent);
                        self.cache_store(module, percent).await;
                        return LoadedPercent::new(percent, PercentSource::Remote, None);
                    }
                    None => FallbackReason::MissingField,
                },
                Ok(None) => FallbackReason::NoDocument,
                Err(err) => {
                    log::warn!("remote progress read for {module} failed: {err}");
                    FallbackReason::RemoteUnavailable(err.to_string())
                }
            },
        };

        self.load_cached(module, fallback).await
    }

    async fn load_cached(&mut self, module: ModuleKey, fallback: FallbackReason) -> LoadedPercent {
        let fallback = match self.cache.get(module.field_name()).await {
            Ok(Some(raw)) => {
                if let Some(percent) = parse_cached_percent(&raw) {
                    self.known.insert(module, percent);
                    return LoadedPercent::new(percent, PercentSource::Cache, Some(fallback));
                }
                log::warn!("ignoring unreadable cache entry for {module}: {raw:?}");
                fallback
            }
            Ok(None) => fallback,
            Err(err) => {
                log::warn!("progress cache read for {module} failed: {err}");
                FallbackReason::CacheUnavailable(err.to_string())
            }
        };

        let percent = self.known_percent(module).unwrap_or(Percent::ZERO);
        LoadedPercent::new(percent, PercentSource::Default, Some(fallback))
    }

    /// Records an observed completion percent for one module.
    ///
    /// Only strictly greater values are accepted; an equal or smaller value
    /// is a no-op, which keeps stored progress monotonic no matter how often
    /// a screen reports its position. Accepted values are cached right away
    /// and queued for remote sync when a principal is present.
    pub async fn record(&mut self, module: ModuleKey, observed: Percent) -> RecordOutcome {
        let known = self.known_percent(module).unwrap_or(Percent::ZERO);
        if observed <= known {
            return RecordOutcome::Ignored;
        }

        self.known.insert(module, observed);
        self.cache_store(module, observed).await;

        if self.principal.is_some() {
            self.pending.push(module, observed);
            self.flush_pending().await;
        }
        RecordOutcome::Advanced
    }

    /// Pushes queued writes to the remote document.
    ///
    /// A failed write stays queued and is retried on the next record or
    /// explicit flush; the cache already holds the value, so nothing is
    /// rolled back.
    pub async fn flush_pending(&mut self) {
        let Some(principal) = self.principal.clone() else {
            return;
        };

        for (module, percent) in self.pending.take() {
            let record =
                ProgressRecord::new(principal.id().clone(), module, percent, self.clock.now());
            if let Err(err) = self.documents.merge_progress(&record, principal.email()).await {
                log::warn!("remote progress sync for {module} failed, write stays queued: {err}");
                self.pending.push(module, percent);
            }
        }
    }

    /// Rounded unweighted mean over the given modules.
    ///
    /// Modules without a known value count as zero. Rounds half up. An
    /// empty slice yields zero.
    #[must_use]
    pub fn aggregate(&self, modules: &[ModuleKey]) -> Percent {
        let Ok(n) = u32::try_from(modules.len()) else {
            return Percent::ZERO;
        };
        if n == 0 {
            return Percent::ZERO;
        }
        let sum: u32 = modules
            .iter()
            .map(|module| u32::from(self.known.get(module).map_or(0, |p| p.value())))
            .sum();
        // Mean of values in [0, 100] stays in range.
        Percent::clamped(u8::try_from((2 * sum + n) / (2 * n)).unwrap_or(u8::MAX))
    }

    /// Overall completion across all modules.
    #[must_use]
    pub fn overall_progress(&self) -> Percent {
        self.aggregate(&ModuleKey::ALL)
    }

    /// Clears locally held progress: cache entries, in-memory values, and
    /// queued writes. Remote data is left untouched; this is the sign-out
    /// path, not a reset.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the cache cannot be
    /// cleared.
    pub async fn clear_local(&mut self) -> Result<(), ProgressServiceError> {
        let keys: Vec<&str> = ModuleKey::ALL.iter().map(|m| m.field_name()).collect();
        self.cache.remove_many(&keys).await?;
        self.known.clear();
        self.pending.clear();
        Ok(())
    }

    async fn cache_store(&self, module: ModuleKey, percent: Percent) {
        let value = percent.value().to_string();
        if let Err(err) = self.cache.set(module.field_name(), &value).await {
            log::warn!("progress cache write for {module} failed: {err}");
        }
    }
}

/// Cache values are bare decimal percents; anything else is treated as
/// absent rather than an error.
fn parse_cached_percent(raw: &str) -> Option<Percent> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(|value| Percent::new(value).ok())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
