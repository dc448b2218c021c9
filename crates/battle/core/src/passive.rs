//! Passive ledger: stackable status effects per combatant.
//!
//! Each combatant carries one [`PassiveLedger`] mapping passive kind to a
//! stack count.
//!
//! # Invariants
//!
//! - Stack counts never go below zero; every mutation clamps
//! - A kind whose count reaches zero is removed, never stored as zero, so
//!   "has passive" is a plain membership check

use arrayvec::ArrayVec;
use strum::EnumCount;

/// Kinds of stackable passives.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PassiveKind {
    /// Prevention shield. Each stack absorbs one point of damage at impact.
    Aegis,

    /// Raises the chance that this combatant's planned attacks are ambushes.
    Stealth,

    /// Each stack weakens block assigned by this combatant by one point.
    Corrosion,
}

impl PassiveKind {
    /// Returns true for kinds that prevent damage at impact.
    pub const fn is_prevention(self) -> bool {
        matches!(self, PassiveKind::Aegis)
    }
}

/// One passive kind and its stack count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassiveStack {
    pub kind: PassiveKind,
    pub amount: u32,
}

/// Stack counts per passive kind for a single combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassiveLedger {
    stacks: ArrayVec<PassiveStack, { PassiveKind::COUNT }>,
}

impl PassiveLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            stacks: ArrayVec::new(),
        }
    }

    /// Current stack count, zero when absent.
    pub fn amount(&self, kind: PassiveKind) -> u32 {
        self.stacks
            .iter()
            .find(|stack| stack.kind == kind)
            .map_or(0, |stack| stack.amount)
    }

    /// Returns true if at least one stack of `kind` is present.
    pub fn has(&self, kind: PassiveKind) -> bool {
        self.stacks.iter().any(|stack| stack.kind == kind)
    }

    /// Adds `delta` stacks. Returns the new count.
    pub fn apply(&mut self, kind: PassiveKind, delta: u32) -> u32 {
        self.set(kind, self.amount(kind).saturating_add(delta))
    }

    /// Adds a signed delta, clamping at zero. Returns the new count.
    pub fn update(&mut self, kind: PassiveKind, delta: i32) -> u32 {
        let current = i64::from(self.amount(kind));
        let next = (current + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
        self.set(kind, next)
    }

    /// Removes every stack of `kind`. Returns how many stacks were removed.
    pub fn remove(&mut self, kind: PassiveKind) -> u32 {
        let removed = self.amount(kind);
        self.stacks.retain(|stack| stack.kind != kind);
        removed
    }

    /// Removes up to `amount` stacks. Returns how many were actually removed,
    /// which never exceeds what was present.
    pub fn consume(&mut self, kind: PassiveKind, amount: u32) -> u32 {
        let current = self.amount(kind);
        let consumed = current.min(amount);
        self.set(kind, current - consumed);
        consumed
    }

    /// Iterates over present passives.
    pub fn iter(&self) -> impl Iterator<Item = &PassiveStack> {
        self.stacks.iter()
    }

    /// Returns true if no passive is present.
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Drops every passive.
    pub fn clear(&mut self) {
        self.stacks.clear();
    }

    fn set(&mut self, kind: PassiveKind, amount: u32) -> u32 {
        if amount == 0 {
            self.stacks.retain(|stack| stack.kind != kind);
            return 0;
        }

        if let Some(existing) = self.stacks.iter_mut().find(|stack| stack.kind == kind) {
            existing.amount = amount;
        } else {
            // Capacity equals the number of kinds, so a missing kind always fits.
            self.stacks.push(PassiveStack { kind, amount });
        }
        amount
    }
}
