use chrono::{DateTime, Utc};

use super::ids::UserId;
use super::module::ModuleKey;
use super::percent::Percent;

/// One accepted progress value for a `(user, module)` pair.
///
/// This is the unit of a remote merge-write: stores update exactly the field
/// belonging to `module` plus the write metadata, leaving the rest of the
/// per-user document untouched. The stored percent never decreases through
/// normal writes; the services layer enforces that with a strictly-greater
/// guard before a record is ever built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    user_id: UserId,
    module: ModuleKey,
    percent: Percent,
    last_updated: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(
        user_id: UserId,
        module: ModuleKey,
        percent: Percent,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            module,
            percent,
            last_updated,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn module(&self) -> ModuleKey {
        self.module
    }

    #[must_use]
    pub fn percent(&self) -> Percent {
        self.percent
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}
