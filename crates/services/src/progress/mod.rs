//! Progress tracking: per-module load and record with remote sync and a
//! local cache fallback.

mod outcome;
mod pending;
mod service;

pub use outcome::{FallbackReason, LoadedPercent, PercentSource};
pub use pending::PendingWrites;
pub use service::{ProgressService, RecordOutcome};
