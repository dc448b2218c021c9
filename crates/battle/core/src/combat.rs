//! Prevention accounting.
//!
//! Pure functions that split incoming damage across block, prevention
//! passives and HP. Callers apply the resulting numbers; nothing here mutates
//! state.

/// How a single impact's damage was absorbed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Absorption {
    pub incoming: u32,
    pub absorbed_by_block: u32,
    pub absorbed_by_passive: u32,
    pub to_hp: u32,
}

impl Absorption {
    /// Total damage prevented before reaching HP.
    pub fn prevented(&self) -> u32 {
        self.absorbed_by_block + self.absorbed_by_passive
    }

    /// Returns true if any damage reached HP.
    pub fn reached_hp(&self) -> bool {
        self.to_hp > 0
    }
}

/// Splits `incoming` damage in strict order: block first, then the
/// prevention passive, then HP.
///
/// The passive share never exceeds `passive`, so callers can deduct exactly
/// `absorbed_by_passive` stacks.
///
/// # Formula
///
/// ```text
/// absorbed_by_block   = min(incoming, block)
/// absorbed_by_passive = min(incoming - absorbed_by_block, passive)
/// to_hp               = incoming - absorbed_by_block - absorbed_by_passive
/// ```
pub fn absorb(incoming: u32, block: u32, passive: u32) -> Absorption {
    let absorbed_by_block = incoming.min(block);
    let remaining = incoming - absorbed_by_block;
    let absorbed_by_passive = remaining.min(passive);
    let to_hp = remaining - absorbed_by_passive;

    Absorption {
        incoming,
        absorbed_by_block,
        absorbed_by_passive,
        to_hp,
    }
}

/// Apply damage to current HP, clamped at zero.
pub fn apply_damage(current_hp: u32, damage: u32) -> u32 {
    current_hp.saturating_sub(damage)
}
