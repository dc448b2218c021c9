//! Attack progress tracking.
//!
//! One [`AttackProgress`] record exists per in-flight attack context. It
//! aggregates the defender's blocking inputs and derives the damage figures
//! shown to the player and used at impact.
//!
//! # Invariants
//!
//! - Block counters never go negative; removals clamp at zero
//! - After every [`AttackProgress::recompute`]:
//!   `actual_damage == max(0, base_damage - (aegis_total + assigned_block_total))`
//! - `aegis_total` is a snapshot maintained by the registry; recompute never
//!   reads the passive ledger

mod registry;

pub use registry::ProgressRegistry;

use bitflags::bitflags;
use strum::EnumCount;

use crate::attack::{AttackDefinition, SpecialOutcome};
use crate::condition::{self, ConditionSnapshot};
use crate::modifier::ModifierLedger;
use crate::state::{ContextId, EntityId};

/// Color tag of a card played to block.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CardColor {
    Red,
    Blue,
    Green,
    Colorless,
}

impl CardColor {
    const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Derived fields of an [`AttackProgress`] that changed in a recompute.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ProgressFields: u8 {
        const ASSIGNED_BLOCK           = 1 << 0;
        const BASE_DAMAGE              = 1 << 1;
        const DAMAGE_BEFORE_PREVENTION = 1 << 2;
        const ACTUAL_DAMAGE            = 1 << 3;
        const TOTAL_PREVENTED          = 1 << 4;
        const CONDITION_MET            = 1 << 5;
        const FULLY_PREVENTED          = 1 << 6;
    }
}

/// Mutable blocking inputs and derived damage of one attack context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackProgress {
    pub context: ContextId,
    pub attacker: EntityId,
    pub defender: EntityId,

    // Inputs
    pub played_cards: u32,
    pub played_by_color: [u32; CardColor::COUNT],
    pub block_by_color: [u32; CardColor::COUNT],
    pub assigned_block_raw: u32,
    pub block_modifiers: ModifierLedger,
    pub aegis_total: u32,

    // Derived
    pub assigned_block_total: u32,
    pub damage_before_prevention: u32,
    pub base_damage: u32,
    pub actual_damage: u32,
    pub total_prevented_damage: u32,
    pub is_condition_met: bool,
    pub fully_prevented: bool,
}

impl AttackProgress {
    pub fn new(context: ContextId, attacker: EntityId, defender: EntityId, aegis_total: u32) -> Self {
        Self {
            context,
            attacker,
            defender,
            played_cards: 0,
            played_by_color: [0; CardColor::COUNT],
            block_by_color: [0; CardColor::COUNT],
            assigned_block_raw: 0,
            block_modifiers: ModifierLedger::new(),
            aegis_total,
            assigned_block_total: 0,
            damage_before_prevention: 0,
            base_damage: 0,
            actual_damage: 0,
            total_prevented_damage: 0,
            is_condition_met: false,
            fully_prevented: false,
        }
    }

    /// Records one card of `color` contributing `delta` block.
    pub fn on_block_assigned(&mut self, color: CardColor, delta: u32) {
        let i = color.index();
        self.played_cards = self.played_cards.saturating_add(1);
        self.played_by_color[i] = self.played_by_color[i].saturating_add(1);
        self.block_by_color[i] = self.block_by_color[i].saturating_add(delta);
        self.assigned_block_raw = self.assigned_block_raw.saturating_add(delta);
    }

    /// Withdraws one card of `color` and `delta` block, clamping at zero.
    pub fn on_block_removed(&mut self, color: CardColor, delta: u32) {
        let i = color.index();
        self.played_cards = self.played_cards.saturating_sub(1);
        self.played_by_color[i] = self.played_by_color[i].saturating_sub(1);
        self.block_by_color[i] = self.block_by_color[i].saturating_sub(delta);
        self.assigned_block_raw = self.assigned_block_raw.saturating_sub(delta);
    }

    /// Block plus prevention currently standing against the attack.
    pub fn prevention(&self) -> u32 {
        self.assigned_block_total.saturating_add(self.aegis_total)
    }

    /// Returns true when prevention covers the damage before prevention.
    ///
    /// An attack that deals no damage is never blocked.
    pub fn is_blocked(&self) -> bool {
        self.fully_prevented
            || (self.damage_before_prevention > 0
                && self.prevention() >= self.damage_before_prevention)
    }

    fn snapshot(&self, base_damage: u32, fully_prevented: bool) -> ConditionSnapshot {
        ConditionSnapshot {
            assigned_block: self.assigned_block_total,
            aegis: self.aegis_total,
            base_damage,
            played_cards: self.played_cards,
            fully_prevented,
        }
    }

    /// Recomputes every derived field and returns the ones that changed.
    ///
    /// `damage_modifiers` is the planned attack's damage ledger.
    pub fn recompute(
        &mut self,
        definition: &AttackDefinition,
        damage_modifiers: &ModifierLedger,
    ) -> ProgressFields {
        let before = self.clone();

        #[cfg(debug_assertions)]
        self.check_color_sum();

        self.assigned_block_total = self.block_modifiers.apply_to(self.assigned_block_raw);
        self.damage_before_prevention = damage_modifiers.apply_to(definition.damage);

        let outcome = definition
            .hooks
            .run_special(definition, &self.snapshot(self.damage_before_prevention, false));
        self.fully_prevented = outcome == SpecialOutcome::FullyPrevented;

        if self.fully_prevented {
            self.base_damage = self.damage_before_prevention;
            self.actual_damage = 0;
            self.total_prevented_damage = self.damage_before_prevention;
        } else {
            let prevention = self.prevention();
            let bonus = if self.is_blocked() {
                0
            } else {
                definition.bonus_if_unblocked
            };
            self.base_damage = self.damage_before_prevention.saturating_add(bonus);
            self.actual_damage = self.base_damage.saturating_sub(prevention);
            self.total_prevented_damage = prevention;
        }
        self.is_condition_met = condition::evaluate(
            definition.condition,
            &self.snapshot(self.base_damage, self.fully_prevented),
        );

        self.changed_since(&before)
    }

    fn changed_since(&self, before: &Self) -> ProgressFields {
        let mut fields = ProgressFields::empty();
        fields.set(
            ProgressFields::ASSIGNED_BLOCK,
            self.assigned_block_total != before.assigned_block_total,
        );
        fields.set(ProgressFields::BASE_DAMAGE, self.base_damage != before.base_damage);
        fields.set(
            ProgressFields::DAMAGE_BEFORE_PREVENTION,
            self.damage_before_prevention != before.damage_before_prevention,
        );
        fields.set(ProgressFields::ACTUAL_DAMAGE, self.actual_damage != before.actual_damage);
        fields.set(
            ProgressFields::TOTAL_PREVENTED,
            self.total_prevented_damage != before.total_prevented_damage,
        );
        fields.set(
            ProgressFields::CONDITION_MET,
            self.is_condition_met != before.is_condition_met,
        );
        fields.set(
            ProgressFields::FULLY_PREVENTED,
            self.fully_prevented != before.fully_prevented,
        );
        fields
    }

    /// Returns the per-color block sum when it disagrees with the raw total.
    ///
    /// The breakdown can drift when removals clamp per color. The raw total
    /// stays authoritative.
    pub fn block_desync(&self) -> Option<u32> {
        let by_color = self
            .block_by_color
            .iter()
            .fold(0u32, |sum, block| sum.saturating_add(*block));
        (by_color != self.assigned_block_raw).then_some(by_color)
    }

    #[cfg(debug_assertions)]
    fn check_color_sum(&self) {
        if let Some(by_color) = self.block_desync() {
            tracing::warn!(
                target: "battle_core::progress",
                context = %self.context,
                by_color,
                raw = self.assigned_block_raw,
                "block snapshot out of sync with per-color totals"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{AttackHooks, AttackId, NamedHook, SpecialHook};
    use crate::condition::ConditionKind;

    fn record() -> AttackProgress {
        AttackProgress::new(ContextId(1), EntityId(1), EntityId::PLAYER, 0)
    }

    fn slash(damage: u32) -> AttackDefinition {
        AttackDefinition::new(AttackId(1), "slash", damage)
    }

    fn always_prevented(_: &AttackDefinition, _: &ConditionSnapshot) -> SpecialOutcome {
        SpecialOutcome::FullyPrevented
    }

    #[test]
    fn partial_block_reduces_damage() {
        let mut progress = record();
        progress.on_block_assigned(CardColor::Red, 4);
        progress.recompute(&slash(10), &ModifierLedger::new());
        assert_eq!(progress.actual_damage, 6);
        assert_eq!(progress.total_prevented_damage, 4);
    }

    #[test]
    fn over_block_clamps_actual_damage() {
        let mut progress = record();
        progress.on_block_assigned(CardColor::Red, 4);
        progress.on_block_assigned(CardColor::Blue, 7);
        progress.recompute(&slash(10), &ModifierLedger::new());
        assert_eq!(progress.assigned_block_total, 11);
        assert_eq!(progress.actual_damage, 0);
        assert_eq!(progress.total_prevented_damage, 11);
    }

    #[test]
    fn removals_clamp_at_zero() {
        let mut progress = record();
        progress.on_block_removed(CardColor::Green, 5);
        assert_eq!(progress.assigned_block_raw, 0);
        assert_eq!(progress.played_cards, 0);
        progress.on_block_assigned(CardColor::Green, 2);
        progress.on_block_removed(CardColor::Green, 9);
        assert_eq!(progress.assigned_block_raw, 0);
        assert_eq!(progress.block_by_color, [0; CardColor::COUNT]);
    }

    #[test]
    fn bonus_applies_only_when_unblocked() {
        let def = slash(6).with_bonus_if_unblocked(3);
        let mut progress = record();
        progress.recompute(&def, &ModifierLedger::new());
        assert_eq!(progress.base_damage, 9);
        assert_eq!(progress.actual_damage, 9);

        progress.on_block_assigned(CardColor::Red, 6);
        progress.recompute(&def, &ModifierLedger::new());
        assert_eq!(progress.base_damage, 6);
        assert_eq!(progress.actual_damage, 0);
        assert!(progress.is_blocked());
    }

    #[test]
    fn zero_damage_attacks_are_never_blocked() {
        let mut progress = record();
        progress.on_block_assigned(CardColor::Red, 3);
        progress.recompute(&slash(0), &ModifierLedger::new());
        assert!(!progress.is_blocked());
        assert_eq!(progress.actual_damage, 0);
    }

    #[test]
    fn block_modifiers_never_push_total_below_zero() {
        let mut progress = record();
        progress.on_block_assigned(CardColor::Red, 2);
        progress.block_modifiers.add(-5, "corrosion");
        progress.recompute(&slash(4), &ModifierLedger::new());
        assert_eq!(progress.assigned_block_total, 0);
        assert_eq!(progress.actual_damage, 4);
    }

    #[test]
    fn damage_modifiers_feed_damage_before_prevention() {
        let mut progress = record();
        let modifiers = ModifierLedger::new().with(3, "enrage");
        progress.recompute(&slash(5), &modifiers);
        assert_eq!(progress.damage_before_prevention, 8);
        assert_eq!(progress.actual_damage, 8);
    }

    #[test]
    fn condition_follows_block_and_aegis() {
        let def = slash(5).with_condition(ConditionKind::MetOnHit);
        let mut progress = AttackProgress::new(ContextId(1), EntityId(1), EntityId::PLAYER, 2);
        progress.on_block_assigned(CardColor::Red, 2);
        progress.recompute(&def, &ModifierLedger::new());
        assert!(!progress.is_condition_met);

        progress.aegis_total = 3;
        let changed = progress.recompute(&def, &ModifierLedger::new());
        assert!(progress.is_condition_met);
        assert!(changed.contains(ProgressFields::CONDITION_MET));
        assert!(changed.contains(ProgressFields::ACTUAL_DAMAGE));
    }

    #[test]
    fn unchanged_recompute_reports_nothing() {
        let mut progress = record();
        progress.recompute(&slash(5), &ModifierLedger::new());
        let changed = progress.recompute(&slash(5), &ModifierLedger::new());
        assert!(changed.is_empty());
    }

    #[test]
    fn actual_damage_invariant_holds_on_small_grid() {
        for damage in 0..8 {
            for block in 0..8 {
                for aegis in 0..8 {
                    let mut progress =
                        AttackProgress::new(ContextId(1), EntityId(1), EntityId::PLAYER, aegis);
                    progress.on_block_assigned(CardColor::Colorless, block);
                    progress.recompute(&slash(damage), &ModifierLedger::new());
                    assert_eq!(
                        progress.actual_damage,
                        progress
                            .base_damage
                            .saturating_sub(progress.aegis_total + progress.assigned_block_total)
                    );
                }
            }
        }
    }

    #[test]
    fn clamped_removal_is_reported_as_desync() {
        let mut progress = record();
        progress.on_block_assigned(CardColor::Red, 2);
        progress.on_block_assigned(CardColor::Blue, 3);
        assert_eq!(progress.block_desync(), None);

        progress.on_block_removed(CardColor::Red, 5);
        assert_eq!(progress.assigned_block_raw, 0);
        assert_eq!(progress.block_desync(), Some(3));

        progress.recompute(&slash(6), &ModifierLedger::new());
        assert_eq!(progress.assigned_block_total, 0);
        assert_eq!(progress.actual_damage, 6);
    }

    #[test]
    fn full_prevention_runs_through_the_condition() {
        let hooks = AttackHooks {
            special: Some(NamedHook::new("always_prevented", always_prevented as SpecialHook)),
            ..AttackHooks::default()
        };
        let def = slash(7)
            .with_condition(ConditionKind::BlockedByExactly(2))
            .with_hooks(hooks);
        let mut progress = record();
        progress.on_block_assigned(CardColor::Green, 1);
        let changed = progress.recompute(&def, &ModifierLedger::new());
        assert!(progress.fully_prevented);
        assert!(progress.is_blocked());
        assert!(progress.is_condition_met);
        assert_eq!(progress.actual_damage, 0);
        assert_eq!(progress.total_prevented_damage, 7);
        assert!(changed.contains(ProgressFields::CONDITION_MET | ProgressFields::FULLY_PREVENTED));

        let plain = slash(7).with_condition(ConditionKind::BlockedByExactly(2));
        progress.recompute(&plain, &ModifierLedger::new());
        assert!(!progress.fully_prevented);
        assert!(!progress.is_condition_met);
    }
}
