use std::collections::HashMap;

use chem_core::model::{ModuleKey, Percent};

/// Coalescing queue of module writes awaiting remote sync.
///
/// Holds at most one pending percent per module; a later write to the same
/// module replaces the earlier one. The strictly-greater guard in
/// `ProgressService::record` means the surviving value is always the
/// largest observed, so dropping the intermediate writes loses nothing.
#[derive(Debug, Clone, Default)]
pub struct PendingWrites {
    slots: HashMap<ModuleKey, Percent>,
}

impl PendingWrites {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a write, replacing any earlier write for the same module.
    pub fn push(&mut self, module: ModuleKey, percent: Percent) {
        self.slots.insert(module, percent);
    }

    /// Drains all queued writes, leaving the queue empty.
    pub fn take(&mut self) -> Vec<(ModuleKey, Percent)> {
        self.slots.drain().collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(value: u8) -> Percent {
        Percent::new(value).unwrap()
    }

    #[test]
    fn later_write_replaces_earlier_for_same_module() {
        let mut pending = PendingWrites::new();
        pending.push(ModuleKey::AcidBase, percent(20));
        pending.push(ModuleKey::AcidBase, percent(45));
        pending.push(ModuleKey::Redox, percent(10));

        assert_eq!(pending.len(), 2);
        let mut drained = pending.take();
        drained.sort_by_key(|(module, _)| *module);
        assert_eq!(
            drained,
            vec![
                (ModuleKey::AcidBase, percent(45)),
                (ModuleKey::Redox, percent(10)),
            ]
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn take_on_empty_queue_yields_nothing() {
        let mut pending = PendingWrites::new();
        assert!(pending.take().is_empty());
    }
}
