//! Immutable attack definitions and the catalog that owns them.
//!
//! Definitions are shared behind `Arc` by every planned attack that
//! references them. Attack-specific behavior is attached as optional
//! callbacks ([`AttackHooks`]) rather than through a type hierarchy.

mod hook;

pub use hook::{
    AttackHooks, EffectHook, HookArgs, HookEffect, HookLibrary, NamedHook, SpecialHook,
    SpecialOutcome,
};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::condition::ConditionKind;
use crate::error::CatalogError;

/// Identifier of an attack definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackId(pub u32);

impl fmt::Display for AttackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "atk:{}", self.0)
    }
}

/// Static description of one attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackDefinition {
    pub id: AttackId,
    pub name: String,
    /// Damage before modifiers, bonuses and prevention.
    pub damage: u32,
    /// Extra damage added when the attack is not fully blocked.
    pub bonus_if_unblocked: u32,
    pub condition: ConditionKind,
    /// Telegraph template. `{damage}` is replaced with the planned damage.
    pub telegraph: String,
    pub hooks: AttackHooks,
}

impl AttackDefinition {
    pub fn new(id: AttackId, name: impl Into<String>, damage: u32) -> Self {
        Self {
            id,
            name: name.into(),
            damage,
            bonus_if_unblocked: 0,
            condition: ConditionKind::Always,
            telegraph: String::from("{damage}"),
            hooks: AttackHooks::default(),
        }
    }

    pub fn with_condition(mut self, condition: ConditionKind) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_bonus_if_unblocked(mut self, bonus: u32) -> Self {
        self.bonus_if_unblocked = bonus;
        self
    }

    pub fn with_telegraph(mut self, telegraph: impl Into<String>) -> Self {
        self.telegraph = telegraph.into();
        self
    }

    pub fn with_hooks(mut self, hooks: AttackHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Renders the telegraph shown to the player with `damage` substituted.
    ///
    /// Ambush attacks are hidden until revealed.
    pub fn telegraph_text(&self, damage: u32, is_ambush: bool) -> String {
        if is_ambush {
            return String::from("???");
        }
        self.telegraph.replace("{damage}", &damage.to_string())
    }
}

/// Registry of attack definitions keyed by id.
#[derive(Clone, Debug, Default)]
pub struct AttackCatalog {
    definitions: HashMap<AttackId, Arc<AttackDefinition>>,
}

impl AttackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition. Ids must be unique.
    pub fn register(&mut self, definition: AttackDefinition) -> Result<(), CatalogError> {
        if self.definitions.contains_key(&definition.id) {
            return Err(CatalogError::DuplicateAttack(definition.id));
        }
        self.definitions
            .insert(definition.id, Arc::new(definition));
        Ok(())
    }

    /// Looks up a definition.
    pub fn get(&self, id: AttackId) -> Option<Arc<AttackDefinition>> {
        self.definitions.get(&id).cloned()
    }

    pub fn contains(&self, id: AttackId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<AttackDefinition> for Result<AttackCatalog, CatalogError> {
    fn from_iter<I: IntoIterator<Item = AttackDefinition>>(iter: I) -> Self {
        let mut catalog = AttackCatalog::new();
        for definition in iter {
            catalog.register(definition)?;
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut catalog = AttackCatalog::new();
        catalog
            .register(AttackDefinition::new(AttackId(1), "slash", 6))
            .unwrap();
        let err = catalog
            .register(AttackDefinition::new(AttackId(1), "stab", 3))
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateAttack(AttackId(1)));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn telegraph_renders_damage_and_hides_ambush() {
        let def = AttackDefinition::new(AttackId(2), "bite", 9).with_telegraph("Bite for {damage}");
        assert_eq!(def.telegraph_text(def.damage, false), "Bite for 9");
        assert_eq!(def.telegraph_text(12, false), "Bite for 12");
        assert_eq!(def.telegraph_text(12, true), "???");
    }

    #[test]
    fn catalog_collects_from_iterator() {
        let catalog: Result<AttackCatalog, _> = vec![
            AttackDefinition::new(AttackId(1), "a", 1),
            AttackDefinition::new(AttackId(2), "b", 2),
        ]
        .into_iter()
        .collect();
        let catalog = catalog.unwrap();
        assert!(catalog.contains(AttackId(2)));
        assert_eq!(catalog.get(AttackId(1)).map(|d| d.damage), Some(1));
    }
}
