//! Battle events and the synchronous bus that delivers them.
//!
//! Everything that crosses the boundary between the engine and its
//! collaborators (presentation, input, telemetry) is a [`BattleEvent`].
//! Inbound events ask the engine to do something; outbound events report
//! what it did. Both travel through the same [`EventBus`].

mod bus;
mod journal;

pub use bus::{EventBus, EventHandler, FnHandler, SubscriptionId};
pub use journal::{EventJournal, JournalEntry};

use std::fmt;

use battle_core::{
    AttackId, CardColor, ContextId, EntityId, MinorPhase, PassiveKind, PhaseState,
};
use serde::{Deserialize, Serialize};

/// Every event the engine consumes or produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::EnumDiscriminants)]
#[strum_discriminants(
    name(BattleEventKind),
    derive(Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr, strum::EnumIter),
    strum(serialize_all = "snake_case")
)]
pub enum BattleEvent {
    // ------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------
    RequestPhaseChange {
        target: MinorPhase,
    },
    ResolveAttack {
        context: ContextId,
    },
    /// Published by presentation when an attack animation makes contact.
    ImpactNow {
        context: ContextId,
    },
    BlockAssigned {
        context: ContextId,
        color: CardColor,
        delta: u32,
    },
    BlockRemoved {
        context: ContextId,
        color: CardColor,
        delta: u32,
    },
    ModifyBlock {
        context: ContextId,
        delta: i32,
        reason: String,
    },
    RemoveBlockModifier {
        context: ContextId,
        reason: String,
    },
    ModifyDamage {
        context: ContextId,
        delta: i32,
        reason: String,
    },
    RemoveDamageModifier {
        context: ContextId,
        reason: String,
    },
    ApplyPassive {
        target: EntityId,
        kind: PassiveKind,
        delta: u32,
    },
    RemovePassive {
        target: EntityId,
        kind: PassiveKind,
    },
    UpdatePassive {
        target: EntityId,
        kind: PassiveKind,
        delta: i32,
    },
    /// Damage headed for `target`. With a context it joins that attack's
    /// impact; without one it joins any impact awaiting the same target or
    /// lands immediately.
    DamageIntent {
        source: EntityId,
        target: EntityId,
        amount: u32,
        attack: Option<AttackId>,
        context: Option<ContextId>,
    },
    Heal {
        target: EntityId,
        amount: u32,
    },

    // ------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------
    PhaseChanged {
        previous: PhaseState,
        current: PhaseState,
    },
    PlannedAttack {
        attacker: EntityId,
        attack: AttackId,
        context: ContextId,
        step: u32,
        turn: u32,
        telegraph: String,
        preview: bool,
        ambush: bool,
    },
    AttackRevealed {
        attacker: EntityId,
        attack: AttackId,
        context: ContextId,
    },
    ProgressUpdated {
        context: ContextId,
        actual_damage: u32,
        total_prevented: u32,
        condition_met: bool,
    },
    AttackResolved {
        context: ContextId,
        attack: AttackId,
        condition_met: bool,
    },
    HpChanged {
        target: EntityId,
        delta: i32,
        hp: u32,
    },
    AttackHit {
        attack: AttackId,
        hits: u32,
    },
    PassiveChanged {
        target: EntityId,
        kind: PassiveKind,
        amount: u32,
    },
    CombatantDefeated {
        entity: EntityId,
    },
}

impl BattleEvent {
    pub fn kind(&self) -> BattleEventKind {
        BattleEventKind::from(self)
    }

    /// Context the event refers to, if any.
    pub fn context(&self) -> Option<ContextId> {
        match self {
            BattleEvent::ResolveAttack { context }
            | BattleEvent::ImpactNow { context }
            | BattleEvent::BlockAssigned { context, .. }
            | BattleEvent::BlockRemoved { context, .. }
            | BattleEvent::ModifyBlock { context, .. }
            | BattleEvent::RemoveBlockModifier { context, .. }
            | BattleEvent::ModifyDamage { context, .. }
            | BattleEvent::RemoveDamageModifier { context, .. }
            | BattleEvent::PlannedAttack { context, .. }
            | BattleEvent::AttackRevealed { context, .. }
            | BattleEvent::ProgressUpdated { context, .. }
            | BattleEvent::AttackResolved { context, .. } => Some(*context),
            BattleEvent::DamageIntent { context, .. } => *context,
            _ => None,
        }
    }

    pub fn phase_request(target: MinorPhase) -> Self {
        BattleEvent::RequestPhaseChange { target }
    }
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::RequestPhaseChange { target } => write!(f, "request_phase_change {target}"),
            BattleEvent::PhaseChanged { previous, current } => write!(
                f,
                "phase_changed {} -> {} (turn {})",
                previous.minor, current.minor, current.turn
            ),
            BattleEvent::PlannedAttack {
                attacker,
                attack,
                step,
                turn,
                telegraph,
                preview,
                ..
            } => write!(
                f,
                "planned_attack {attacker} {attack} turn {turn} step {step} \"{telegraph}\"{}",
                if *preview { " (preview)" } else { "" }
            ),
            BattleEvent::DamageIntent {
                source,
                target,
                amount,
                ..
            } => write!(f, "damage_intent {source} -> {target} for {amount}"),
            BattleEvent::HpChanged { target, delta, hp } => {
                write!(f, "hp_changed {target} {delta:+} -> {hp}")
            }
            BattleEvent::AttackResolved {
                attack,
                condition_met,
                ..
            } => write!(f, "attack_resolved {attack} condition_met={condition_met}"),
            BattleEvent::PassiveChanged { target, kind, amount } => {
                write!(f, "passive_changed {target} {kind}={amount}")
            }
            BattleEvent::CombatantDefeated { entity } => write!(f, "combatant_defeated {entity}"),
            other => match other.context() {
                Some(context) => write!(f, "{} {context}", other.kind()),
                None => write!(f, "{}", other.kind()),
            },
        }
    }
}
