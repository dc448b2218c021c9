//! Error types for battle setup.
//!
//! Gameplay mutations never fail: a missing combatant, context or passive is
//! treated as empty and the operation becomes a no-op. Errors only arise
//! while assembling a battle, from configuration, catalogs and rosters that
//! do not hang together.

use crate::attack::AttackId;
use crate::state::EntityId;

/// Invalid [`BattleConfig`](crate::BattleConfig) values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("ambush base chance {0} is outside 0..=100")]
    AmbushChanceOutOfRange(u32),

    #[error("journal capacity must be at least 1")]
    ZeroJournalCapacity,

    #[error("max dispatch depth must be at least 1")]
    ZeroDispatchDepth,

    #[error("impact timeout must be positive, got {0}")]
    NonPositiveTimeout(f32),
}

/// Problems registering attack definitions or resolving their references.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("attack {0} is already registered")]
    DuplicateAttack(AttackId),

    #[error("combatant {referenced_by} references unknown attack {attack}")]
    UnknownAttack {
        attack: AttackId,
        referenced_by: EntityId,
    },

    #[error("unknown hook '{0}'")]
    UnknownHook(String),
}

/// Problems assembling the combatants of a battle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("combatant {0} appears more than once")]
    DuplicateCombatant(EntityId),

    #[error("roster has no player combatant")]
    MissingPlayer,

    #[error("roster has more than one player combatant")]
    MultiplePlayers,
}
