use std::collections::HashMap;

use tracing::debug;

use super::AttackProgress;
use crate::state::{ContextId, EntityId};

/// Owner of every live [`AttackProgress`] record, keyed by context.
///
/// Records are created lazily and destroyed together with their planned
/// attack.
#[derive(Clone, Debug, Default)]
pub struct ProgressRegistry {
    records: HashMap<ContextId, AttackProgress>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, context: ContextId) -> Option<&AttackProgress> {
        self.records.get(&context)
    }

    pub fn get_mut(&mut self, context: ContextId) -> Option<&mut AttackProgress> {
        self.records.get_mut(&context)
    }

    pub fn contains(&self, context: ContextId) -> bool {
        self.records.contains_key(&context)
    }

    /// Returns the record for `context`, creating it if absent.
    ///
    /// `aegis_total` seeds the prevention snapshot of a new record.
    pub fn create(
        &mut self,
        context: ContextId,
        attacker: EntityId,
        defender: EntityId,
        aegis_total: u32,
    ) -> &mut AttackProgress {
        self.records.entry(context).or_insert_with(|| {
            debug!(target: "battle_core::progress", %context, %defender, "progress created");
            AttackProgress::new(context, attacker, defender, aegis_total)
        })
    }

    pub fn destroy(&mut self, context: ContextId) -> Option<AttackProgress> {
        let removed = self.records.remove(&context);
        if removed.is_some() {
            debug!(target: "battle_core::progress", %context, "progress destroyed");
        }
        removed
    }

    /// Contexts of records defended by `defender`, in stable order.
    pub fn contexts_defended_by(&self, defender: EntityId) -> Vec<ContextId> {
        let mut contexts: Vec<_> = self
            .records
            .values()
            .filter(|record| record.defender == defender)
            .map(|record| record.context)
            .collect();
        contexts.sort();
        contexts
    }

    /// Contexts of records attacked by `attacker`, in stable order.
    pub fn contexts_attacked_by(&self, attacker: EntityId) -> Vec<ContextId> {
        let mut contexts: Vec<_> = self
            .records
            .values()
            .filter(|record| record.attacker == attacker)
            .map(|record| record.context)
            .collect();
        contexts.sort();
        contexts
    }

    /// Shifts the prevention snapshot of every record defended by
    /// `defender`. Returns the contexts touched.
    pub fn adjust_aegis(&mut self, defender: EntityId, delta: i32) -> Vec<ContextId> {
        let contexts = self.contexts_defended_by(defender);
        for context in &contexts {
            if let Some(record) = self.records.get_mut(context) {
                record.aegis_total = record.aegis_total.saturating_add_signed(delta);
            }
        }
        contexts
    }

    /// Zeroes the prevention snapshot of every record defended by
    /// `defender`. Returns the contexts touched.
    pub fn reset_aegis(&mut self, defender: EntityId) -> Vec<ContextId> {
        let contexts = self.contexts_defended_by(defender);
        for context in &contexts {
            if let Some(record) = self.records.get_mut(context) {
                record.aegis_total = 0;
            }
        }
        contexts
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttackProgress> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_idempotent() {
        let mut registry = ProgressRegistry::new();
        registry.create(ContextId(1), EntityId(1), EntityId::PLAYER, 2).aegis_total = 5;
        let record = registry.create(ContextId(1), EntityId(1), EntityId::PLAYER, 2);
        assert_eq!(record.aegis_total, 5);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn aegis_adjusts_every_record_of_the_defender() {
        let mut registry = ProgressRegistry::new();
        registry.create(ContextId(1), EntityId(1), EntityId::PLAYER, 0);
        registry.create(ContextId(2), EntityId(2), EntityId::PLAYER, 0);
        registry.create(ContextId(3), EntityId::PLAYER, EntityId(1), 0);

        let touched = registry.adjust_aegis(EntityId::PLAYER, 3);
        assert_eq!(touched, vec![ContextId(1), ContextId(2)]);
        assert_eq!(registry.get(ContextId(2)).map(|r| r.aegis_total), Some(3));
        assert_eq!(registry.get(ContextId(3)).map(|r| r.aegis_total), Some(0));

        registry.adjust_aegis(EntityId::PLAYER, -10);
        assert_eq!(registry.get(ContextId(1)).map(|r| r.aegis_total), Some(0));

        registry.adjust_aegis(EntityId::PLAYER, 4);
        registry.reset_aegis(EntityId::PLAYER);
        assert!(registry.iter().all(|r| r.aegis_total == 0));
    }

    #[test]
    fn destroy_removes_record() {
        let mut registry = ProgressRegistry::new();
        registry.create(ContextId(9), EntityId(1), EntityId::PLAYER, 0);
        assert!(registry.destroy(ContextId(9)).is_some());
        assert!(registry.destroy(ContextId(9)).is_none());
        assert!(registry.is_empty());
    }
}
