use std::fmt;

/// Unique identifier for any combatant taking part in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the player-controlled combatant.
    pub const PLAYER: Self = Self(0);

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::PLAYER
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque token identifying one resolution instance of one planned attack.
///
/// The high 64 bits come from the battle RNG, the low 64 bits from a counter
/// that never repeats within a battle, so two planned attacks can never share
/// a context even if the random halves collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextId(pub u128);

impl ContextId {
    /// Builds a context from a random half and a unique sequence number.
    #[inline]
    pub const fn from_parts(random: u64, sequence: u64) -> Self {
        Self(((random as u128) << 64) | sequence as u128)
    }

    /// Sequence number the context was issued with.
    #[inline]
    pub const fn sequence(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}
