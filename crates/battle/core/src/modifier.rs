//! Damage and block modifier ledgers.
//!
//! A ledger is an ordered list of signed deltas, each tagged with the reason
//! that produced it. The effective value is the base plus the sum of deltas,
//! clamped at zero. Effects that expire by name remove their entries by
//! reason.
//!
//! # Example
//! ```
//! # use battle_core::modifier::ModifierLedger;
//! let ledger = ModifierLedger::new()
//!     .with(3, "enrage")
//!     .with(-2, "corrosion");
//!
//! assert_eq!(ledger.total(), 1);
//! assert_eq!(ledger.apply_to(10), 11);
//! ```

use std::borrow::Cow;

/// A single signed adjustment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modification {
    pub delta: i32,
    pub reason: Cow<'static, str>,
}

impl Modification {
    pub fn new(delta: i32, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            delta,
            reason: reason.into(),
        }
    }
}

/// Ordered list of modifications for one action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierLedger {
    entries: Vec<Modification>,
}

impl ModifierLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a modification.
    pub fn add(&mut self, delta: i32, reason: impl Into<Cow<'static, str>>) {
        self.entries.push(Modification::new(delta, reason));
    }

    /// Removes every modification with a matching reason. Returns how many
    /// were removed.
    pub fn remove_reason(&mut self, reason: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.reason != reason);
        before - self.entries.len()
    }

    /// Sum of all deltas.
    pub fn total(&self) -> i32 {
        self.entries
            .iter()
            .fold(0i32, |acc, entry| acc.saturating_add(entry.delta))
    }

    /// Applies the ledger to a base value, clamping at zero.
    pub fn apply_to(&self, base: u32) -> u32 {
        let value = i64::from(base) + i64::from(self.total());
        value.clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modification> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Builder-style construction.
impl ModifierLedger {
    pub fn with(mut self, delta: i32, reason: impl Into<Cow<'static, str>>) -> Self {
        self.add(delta, reason);
        self
    }
}
