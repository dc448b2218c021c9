//! Data-driven battle content and loaders.
//!
//! This crate turns data files into the values `battle-core` consumes:
//! - Battle configuration (data-driven via TOML)
//! - Encounters: attack catalog plus combatant roster (data-driven via RON)
//!
//! Attack hooks are referenced by name and resolved against a
//! [`HookLibrary`](battle_core::HookLibrary) while building an encounter.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AttackSpec, CombatantSpec, ConfigLoader, ContentFactory, Encounter, EncounterLoader,
    EncounterSpec, RepertoireSpec,
};
