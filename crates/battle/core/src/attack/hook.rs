//! Per-attack behavior attached as optional callbacks.
//!
//! Hooks are plain `fn` pointers stored under a stable name. Effect hooks
//! return their consequences as [`HookEffect`] data; the runtime turns those
//! into events, so hooks never touch battle state directly.

use std::collections::HashMap;
use std::fmt;

use super::{AttackDefinition, AttackId};
use crate::condition::ConditionSnapshot;
use crate::error::CatalogError;
use crate::passive::PassiveKind;
use crate::state::{ContextId, EntityId};

/// Arguments passed to reveal and hit hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookArgs {
    pub attack: AttackId,
    pub context: ContextId,
    pub source: EntityId,
    pub target: EntityId,
    /// Condition result frozen when the attack started resolving.
    pub condition_met: bool,
}

/// Consequence requested by a hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookEffect {
    ApplyPassive {
        target: EntityId,
        kind: PassiveKind,
        amount: u32,
    },
    DirectDamage {
        target: EntityId,
        amount: u32,
    },
    Heal {
        target: EntityId,
        amount: u32,
    },
}

/// Outcome of a special hook run at the start of a recompute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpecialOutcome {
    /// Continue with the standard damage computation.
    #[default]
    Proceed,
    /// The attack is prevented through a non-standard path; skip the rest.
    FullyPrevented,
}

pub type EffectHook = fn(&HookArgs) -> Vec<HookEffect>;
pub type SpecialHook = fn(&AttackDefinition, &ConditionSnapshot) -> SpecialOutcome;

/// A hook function together with the name it was registered under.
#[derive(Clone, Copy)]
pub struct NamedHook<F> {
    pub name: &'static str,
    pub hook: F,
}

impl<F> NamedHook<F> {
    pub const fn new(name: &'static str, hook: F) -> Self {
        Self { name, hook }
    }
}

impl<F> fmt::Debug for NamedHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Hooks are identified by name; comparing function addresses is unreliable.
impl<F> PartialEq for NamedHook<F> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<F> Eq for NamedHook<F> {}

/// Optional callbacks of one attack definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackHooks {
    /// Fired when the attack is revealed during PreBlock.
    pub on_reveal: Option<NamedHook<EffectHook>>,
    /// Fired at impact when damage reached HP and the attack was not blocked.
    pub on_hit: Option<NamedHook<EffectHook>>,
    /// Runs first in every recompute and may short-circuit it.
    pub special: Option<NamedHook<SpecialHook>>,
}

impl AttackHooks {
    pub fn is_empty(&self) -> bool {
        self.on_reveal.is_none() && self.on_hit.is_none() && self.special.is_none()
    }

    pub fn run_on_reveal(&self, args: &HookArgs) -> Vec<HookEffect> {
        self.on_reveal.map(|h| (h.hook)(args)).unwrap_or_default()
    }

    pub fn run_on_hit(&self, args: &HookArgs) -> Vec<HookEffect> {
        self.on_hit.map(|h| (h.hook)(args)).unwrap_or_default()
    }

    pub fn run_special(
        &self,
        definition: &AttackDefinition,
        snapshot: &ConditionSnapshot,
    ) -> SpecialOutcome {
        self.special
            .map(|h| (h.hook)(definition, snapshot))
            .unwrap_or_default()
    }
}

/// Name-indexed registry of hook functions.
///
/// Encounter files reference hooks by name; the loader resolves them here.
#[derive(Clone, Debug, Default)]
pub struct HookLibrary {
    effects: HashMap<&'static str, EffectHook>,
    specials: HashMap<&'static str, SpecialHook>,
}

impl HookLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library preloaded with the stock hooks.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        library.register_effect("corrode", corrode);
        library.register_effect("stealth_up", stealth_up);
        library.register_effect("siphon", siphon);
        library.register_effect("rend", rend);
        library.register_effect("brace", brace);
        library.register_special("parried_by_three", parried_by_three);
        library
    }

    pub fn register_effect(&mut self, name: &'static str, hook: EffectHook) {
        self.effects.insert(name, hook);
    }

    pub fn register_special(&mut self, name: &'static str, hook: SpecialHook) {
        self.specials.insert(name, hook);
    }

    pub fn effect(&self, name: &str) -> Result<NamedHook<EffectHook>, CatalogError> {
        self.effects
            .get_key_value(name)
            .map(|(name, hook)| NamedHook::new(name, *hook))
            .ok_or_else(|| CatalogError::UnknownHook(name.to_owned()))
    }

    pub fn special(&self, name: &str) -> Result<NamedHook<SpecialHook>, CatalogError> {
        self.specials
            .get_key_value(name)
            .map(|(name, hook)| NamedHook::new(name, *hook))
            .ok_or_else(|| CatalogError::UnknownHook(name.to_owned()))
    }
}

// ============================================================================
// Stock hooks
// ============================================================================

/// On hit: one stack of corrosion on the target.
fn corrode(args: &HookArgs) -> Vec<HookEffect> {
    vec![HookEffect::ApplyPassive {
        target: args.target,
        kind: PassiveKind::Corrosion,
        amount: 1,
    }]
}

/// On reveal: the attacker slips into the shadows.
fn stealth_up(args: &HookArgs) -> Vec<HookEffect> {
    vec![HookEffect::ApplyPassive {
        target: args.source,
        kind: PassiveKind::Stealth,
        amount: 1,
    }]
}

/// On hit: the attacker heals.
fn siphon(args: &HookArgs) -> Vec<HookEffect> {
    vec![HookEffect::Heal {
        target: args.source,
        amount: 3,
    }]
}

/// On hit: extra damage unless the blocking condition was met.
fn rend(args: &HookArgs) -> Vec<HookEffect> {
    if args.condition_met {
        return Vec::new();
    }
    vec![HookEffect::DirectDamage {
        target: args.target,
        amount: 2,
    }]
}

/// On reveal: the attacker raises a shield.
fn brace(args: &HookArgs) -> Vec<HookEffect> {
    vec![HookEffect::ApplyPassive {
        target: args.source,
        kind: PassiveKind::Aegis,
        amount: 2,
    }]
}

/// Fully prevented once three or more cards were played against it.
fn parried_by_three(_definition: &AttackDefinition, snapshot: &ConditionSnapshot) -> SpecialOutcome {
    if snapshot.played_cards >= 3 {
        SpecialOutcome::FullyPrevented
    } else {
        SpecialOutcome::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(condition_met: bool) -> HookArgs {
        HookArgs {
            attack: AttackId(1),
            context: ContextId(7),
            source: EntityId(1),
            target: EntityId::PLAYER,
            condition_met,
        }
    }

    #[test]
    fn unknown_names_are_catalog_errors() {
        let library = HookLibrary::builtin();
        assert_eq!(
            library.effect("nope").unwrap_err(),
            CatalogError::UnknownHook("nope".into())
        );
        assert!(library.special("corrode").is_err());
        assert_eq!(library.effect("corrode").unwrap().name, "corrode");
    }

    #[test]
    fn rend_respects_frozen_condition() {
        let library = HookLibrary::builtin();
        let rend = library.effect("rend").unwrap();
        assert!((rend.hook)(&args(true)).is_empty());
        assert_eq!(
            (rend.hook)(&args(false)),
            vec![HookEffect::DirectDamage {
                target: EntityId::PLAYER,
                amount: 2
            }]
        );
    }

    #[test]
    fn missing_hooks_do_nothing() {
        let hooks = AttackHooks::default();
        assert!(hooks.is_empty());
        assert!(hooks.run_on_hit(&args(false)).is_empty());
        let def = AttackDefinition::new(AttackId(1), "slash", 5);
        assert_eq!(
            hooks.run_special(&def, &ConditionSnapshot::default()),
            SpecialOutcome::Proceed
        );
    }

    #[test]
    fn parry_needs_three_cards() {
        let library = HookLibrary::builtin();
        let parry = library.special("parried_by_three").unwrap();
        let def = AttackDefinition::new(AttackId(1), "slash", 5);
        let mut snap = ConditionSnapshot {
            played_cards: 2,
            ..Default::default()
        };
        assert_eq!((parry.hook)(&def, &snap), SpecialOutcome::Proceed);
        snap.played_cards = 3;
        assert_eq!((parry.hook)(&def, &snap), SpecialOutcome::FullyPrevented);
    }
}
