//! Condition evaluator for per-attack blocking conditions.
//!
//! Conditions are pure: they read a [`ConditionSnapshot`] and return a bool.
//! They never touch the ledger or the roster, so recompute passes may call
//! them as often as they like.

/// Blocking condition attached to an attack definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    /// No condition; always met.
    #[default]
    Always,

    /// Met when assigned block plus prevention covers the base damage.
    MetOnHit,

    /// Met when at least N cards were played to block.
    BlockedByAtLeast(u32),

    /// Met when exactly N cards were played to block.
    BlockedByExactly(u32),
}

/// Inputs a condition may look at, copied out of a progress record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConditionSnapshot {
    pub assigned_block: u32,
    pub aegis: u32,
    pub base_damage: u32,
    pub played_cards: u32,
    /// A special hook prevented the whole attack.
    pub fully_prevented: bool,
}

/// Evaluates `kind` against `snapshot`.
///
/// A fully prevented attack meets every condition.
pub fn evaluate(kind: ConditionKind, snapshot: &ConditionSnapshot) -> bool {
    match kind {
        ConditionKind::Always => true,
        ConditionKind::MetOnHit => {
            snapshot.fully_prevented
                || snapshot.assigned_block.saturating_add(snapshot.aegis) >= snapshot.base_damage
        }
        ConditionKind::BlockedByAtLeast(cards) => {
            snapshot.fully_prevented || snapshot.played_cards >= cards
        }
        ConditionKind::BlockedByExactly(cards) => {
            snapshot.fully_prevented || snapshot.played_cards == cards
        }
    }
}
