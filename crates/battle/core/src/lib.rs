//! Deterministic battle resolution rules shared by the runtime and tools.
//!
//! `battle-core` defines the canonical data (phases, planned attacks, progress
//! records, passives) and the pure operations over it: phase projection,
//! intent planning, block/prevention accounting and condition evaluation.
//! Nothing here publishes events or waits on presentation; the runtime crate
//! sequences these operations and reacts to external signals.
pub mod attack;
pub mod combat;
pub mod condition;
pub mod config;
pub mod error;
pub mod intent;
pub mod modifier;
pub mod passive;
pub mod phase;
pub mod progress;
pub mod rng;
pub mod state;

pub use attack::{
    AttackCatalog, AttackDefinition, AttackHooks, AttackId, EffectHook, HookArgs, HookEffect,
    HookLibrary, NamedHook, SpecialHook, SpecialOutcome,
};
pub use combat::{Absorption, absorb, apply_damage};
pub use condition::{ConditionKind, ConditionSnapshot, evaluate};
pub use config::BattleConfig;
pub use error::{CatalogError, ConfigError, RosterError};
pub use intent::{
    AttackIntent, IntentPlanner, PlannedAttack, PlannedNotice, Repertoire, SelectionMode,
};
pub use modifier::{Modification, ModifierLedger};
pub use passive::{PassiveKind, PassiveLedger};
pub use phase::{MajorPhase, MinorPhase, PhaseMachine, PhaseState, PhaseTransition};
pub use progress::{AttackProgress, CardColor, ProgressFields, ProgressRegistry};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use state::{BattleState, CORROSION_REASON, Combatant, ContextId, EntityId, Roster, Side};
