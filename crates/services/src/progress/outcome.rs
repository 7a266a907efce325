use chem_core::model::Percent;

//
// ─── LOAD OUTCOME ──────────────────────────────────────────────────────────────
//

/// Where a loaded percent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentSource {
    /// The remote per-user document.
    Remote,
    /// The local cache, consulted when the remote path was unavailable or
    /// had nothing for this module.
    Cache,
    /// Neither source had a value; the caller gets the best value known
    /// in-memory, or zero.
    Default,
}

/// Why a load did not come from the remote document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No authenticated principal; remote access was never attempted.
    NoPrincipal,
    /// The user has no remote document yet.
    NoDocument,
    /// The document exists but has no field for this module.
    MissingField,
    /// The remote read failed.
    RemoteUnavailable(String),
    /// The local cache read failed after the remote path came up empty.
    CacheUnavailable(String),
}

/// Result of a progress load.
///
/// Loads never fail outright: a value always comes back, and `fallback`
/// says why it is not the remote one when it is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPercent {
    percent: Percent,
    source: PercentSource,
    fallback: Option<FallbackReason>,
}

impl LoadedPercent {
    pub(crate) fn new(
        percent: Percent,
        source: PercentSource,
        fallback: Option<FallbackReason>,
    ) -> Self {
        Self {
            percent,
            source,
            fallback,
        }
    }

    #[must_use]
    pub fn percent(&self) -> Percent {
        self.percent
    }

    #[must_use]
    pub fn source(&self) -> PercentSource {
        self.source
    }

    #[must_use]
    pub fn fallback(&self) -> Option<&FallbackReason> {
        self.fallback.as_ref()
    }

    /// True when the value did not come straight from the remote document.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }
}
