//! Planned attacks and the planner that materializes them.
//!
//! Each attacker owns two [`AttackIntent`] lists: the current turn and a
//! preview of the next one. The preview is promoted when the current list is
//! empty at turn start, so a turn the player has already seen is never
//! re-rolled.

mod planner;

pub use planner::{IntentPlanner, PlannedNotice};

use std::sync::Arc;

use crate::attack::{AttackDefinition, AttackId};
use crate::modifier::ModifierLedger;
use crate::rng::RngOracle;
use crate::state::{ContextId, EntityId};

/// One materialized, not yet resolved attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedAttack {
    pub attack_id: AttackId,
    /// 1-based position within the attacker's turn.
    pub resolve_step: u32,
    pub context: ContextId,
    pub is_ambush: bool,
    /// Set once the attack resolved.
    pub was_blocked: bool,
    /// Set once PreBlock presented the attack.
    pub revealed: bool,
    pub target: EntityId,
    pub definition: Arc<AttackDefinition>,
    pub damage_modifiers: ModifierLedger,
}

impl PlannedAttack {
    /// Damage after modifiers, before any prevention.
    pub fn planned_damage(&self) -> u32 {
        self.damage_modifiers.apply_to(self.definition.damage)
    }

    /// Telegraph text showing the planned damage.
    pub fn telegraph(&self) -> String {
        self.definition.telegraph_text(self.planned_damage(), self.is_ambush)
    }
}

/// Ordered planned attacks of one attacker for one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttackIntent {
    planned: Vec<PlannedAttack>,
}

impl AttackIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attack: PlannedAttack) {
        self.planned.push(attack);
        self.planned.sort_by_key(|planned| planned.resolve_step);
    }

    pub fn get(&self, context: ContextId) -> Option<&PlannedAttack> {
        self.planned.iter().find(|planned| planned.context == context)
    }

    pub fn get_mut(&mut self, context: ContextId) -> Option<&mut PlannedAttack> {
        self.planned
            .iter_mut()
            .find(|planned| planned.context == context)
    }

    pub fn remove(&mut self, context: ContextId) -> Option<PlannedAttack> {
        let index = self
            .planned
            .iter()
            .position(|planned| planned.context == context)?;
        Some(self.planned.remove(index))
    }

    /// Attack with the lowest resolve step.
    pub fn first(&self) -> Option<&PlannedAttack> {
        self.planned.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedAttack> {
        self.planned.iter()
    }

    pub fn contexts(&self) -> impl Iterator<Item = ContextId> + '_ {
        self.planned.iter().map(|planned| planned.context)
    }

    pub fn len(&self) -> usize {
        self.planned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planned.is_empty()
    }

    /// Empties the list and returns what it held.
    pub fn take(&mut self) -> AttackIntent {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.planned.clear();
    }
}

/// How a repertoire picks the attacks for a turn.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SelectionMode {
    /// Walk the turn patterns in order, wrapping around.
    #[default]
    Cycle,
    /// Pick a turn pattern with a seeded roll.
    Random,
}

/// Attack patterns an attacker draws its turns from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Repertoire {
    /// One entry per turn pattern; each lists the attacks in resolve order.
    pub turns: Vec<Vec<AttackId>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: SelectionMode,
}

impl Repertoire {
    pub fn new(turns: Vec<Vec<AttackId>>, mode: SelectionMode) -> Self {
        Self { turns, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.turns.iter().all(Vec::is_empty)
    }

    /// Every attack id the repertoire can select.
    pub fn attack_ids(&self) -> impl Iterator<Item = AttackId> + '_ {
        self.turns.iter().flatten().copied()
    }

    /// Attack ids for the 1-based `turn`.
    pub fn select(&self, turn: u32, rng: &impl RngOracle, seed: u64) -> &[AttackId] {
        if self.turns.is_empty() {
            return &[];
        }
        let index = match self.mode {
            SelectionMode::Cycle => (turn.saturating_sub(1) as usize) % self.turns.len(),
            SelectionMode::Random => rng.index(seed, self.turns.len()),
        };
        &self.turns[index]
    }
}
