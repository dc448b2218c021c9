//! Attack resolution pipeline.
//!
//! Each resolving attack context moves through
//! `Resolving -> AwaitingImpact -> Applied -> Retired`:
//!
//! - **Resolving**: the blocking decision and condition result are frozen
//!   and the attack's damage is requested with a `DamageIntent`
//! - **AwaitingImpact**: damage intents aimed at the context accumulate
//!   until presentation publishes `ImpactNow`
//! - **Applied**: accumulated damage is absorbed by block, then the
//!   prevention passive, then HP
//! - **Retired**: the planned attack and its progress are dropped and the
//!   enemy turn continues
//!
//! A context without a record here is either still planned or already
//! retired.

mod resolve;

pub use resolve::{DamageIntentHandler, ImpactListener, ResolveAttackHandler};

use std::collections::HashMap;

use battle_core::{
    AttackId, ContextId, EntityId, HookEffect, PassiveKind, ProgressFields, absorb,
};
use tracing::debug;

use crate::context::HandlerContext;
use crate::events::{BattleEvent, SubscriptionId};
use crate::rules::enqueue_enemy_flow;

/// Stage of one attack resolution.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStage {
    Resolving,
    AwaitingImpact,
    Applied,
    Retired,
}

/// Per-context record of an attack being resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub context: ContextId,
    pub attacker: EntityId,
    pub target: EntityId,
    pub attack: AttackId,
    pub stage: ResolutionStage,
    /// Whether prevention covered the attack when it started resolving.
    pub blocked_at_resolution: bool,
    /// Condition result captured when the attack started resolving.
    pub condition_met: bool,
    /// Attack credited with a hit at impact, if any.
    pub hit_attack: Option<AttackId>,
    pub pending_damage: u32,
    /// Number of damage intents folded into `pending_damage`.
    pub intents: u32,
    pub(crate) listener: Option<SubscriptionId>,
    started: u64,
}

impl Resolution {
    pub fn new(context: ContextId, attacker: EntityId, target: EntityId, attack: AttackId) -> Self {
        Self {
            context,
            attacker,
            target,
            attack,
            stage: ResolutionStage::Resolving,
            blocked_at_resolution: false,
            condition_met: false,
            hit_attack: None,
            pending_damage: 0,
            intents: 0,
            listener: None,
            started: 0,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.stage == ResolutionStage::AwaitingImpact
    }

    fn advance(&mut self, stage: ResolutionStage) {
        debug!(
            target: "runtime::pipeline",
            context = %self.context,
            from = %self.stage,
            to = %stage,
            "resolution stage"
        );
        self.stage = stage;
    }
}

/// Live resolutions keyed by context.
#[derive(Clone, Debug, Default)]
pub struct Resolutions {
    records: HashMap<ContextId, Resolution>,
    next_started: u64,
}

impl Resolutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut resolution: Resolution) {
        resolution.started = self.next_started;
        self.next_started += 1;
        self.records.insert(resolution.context, resolution);
    }

    pub fn get(&self, context: ContextId) -> Option<&Resolution> {
        self.records.get(&context)
    }

    pub fn get_mut(&mut self, context: ContextId) -> Option<&mut Resolution> {
        self.records.get_mut(&context)
    }

    pub fn contains(&self, context: ContextId) -> bool {
        self.records.contains_key(&context)
    }

    pub fn remove(&mut self, context: ContextId) -> Option<Resolution> {
        self.records.remove(&context)
    }

    pub fn is_awaiting(&self, context: ContextId) -> bool {
        self.get(context).is_some_and(Resolution::is_awaiting)
    }

    /// Oldest resolution awaiting impact on `target`.
    pub fn awaiting_for_target(&self, target: EntityId) -> Option<ContextId> {
        self.records
            .values()
            .filter(|r| r.is_awaiting() && r.target == target)
            .min_by_key(|r| r.started)
            .map(|r| r.context)
    }

    /// Contexts awaiting impact, oldest first.
    pub fn awaiting(&self) -> Vec<ContextId> {
        let mut awaiting: Vec<_> = self.records.values().filter(|r| r.is_awaiting()).collect();
        awaiting.sort_by_key(|r| r.started);
        awaiting.into_iter().map(|r| r.context).collect()
    }

    pub fn of_attacker(&self, attacker: EntityId) -> Vec<ContextId> {
        let mut contexts: Vec<_> = self
            .records
            .values()
            .filter(|r| r.attacker == attacker)
            .map(|r| r.context)
            .collect();
        contexts.sort();
        contexts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record. Returns the impact subscriptions the caller must
    /// release.
    pub fn clear(&mut self) -> Vec<SubscriptionId> {
        self.records
            .drain()
            .filter_map(|(_, resolution)| resolution.listener)
            .collect()
    }
}

// ============================================================================
// Shared application helpers
// ============================================================================

/// Applies damage that is not part of any pending impact: the prevention
/// passive absorbs first, the rest reaches HP.
pub(crate) fn apply_direct_damage(ctx: &mut HandlerContext<'_>, target: EntityId, amount: u32) {
    let aegis = ctx
        .state()
        .roster
        .get(target)
        .map_or(0, |c| c.passives.amount(PassiveKind::Aegis));
    let absorption = absorb(amount, 0, aegis);
    consume_aegis(ctx, target, absorption.absorbed_by_passive);
    apply_hp_damage(ctx, target, absorption.to_hp);
}

/// Requests removal of exactly `consumed` prevention stacks.
pub(crate) fn consume_aegis(ctx: &mut HandlerContext<'_>, target: EntityId, consumed: u32) {
    if consumed == 0 {
        return;
    }
    ctx.publish(BattleEvent::UpdatePassive {
        target,
        kind: PassiveKind::Aegis,
        delta: -i32::try_from(consumed).unwrap_or(i32::MAX),
    });
}

/// Subtracts `damage` from the HP of `target`. Returns the HP lost.
pub(crate) fn apply_hp_damage(ctx: &mut HandlerContext<'_>, target: EntityId, damage: u32) -> u32 {
    if damage == 0 {
        return 0;
    }
    let Some(combatant) = ctx.state_mut().roster.get_mut(target) else {
        return 0;
    };
    let lost = combatant.take_damage(damage);
    let hp = combatant.hp;
    if lost == 0 {
        return 0;
    }
    ctx.publish(BattleEvent::HpChanged {
        target,
        delta: -i32::try_from(lost).unwrap_or(i32::MAX),
        hp,
    });
    if hp == 0 {
        ctx.publish(BattleEvent::CombatantDefeated { entity: target });
    }
    lost
}

/// Publishes `ProgressUpdated` for `context` if `fields` changed.
pub(crate) fn publish_progress(
    ctx: &mut HandlerContext<'_>,
    context: ContextId,
    fields: ProgressFields,
) {
    if fields.is_empty() {
        return;
    }
    let Some(progress) = ctx.state().progress(context) else {
        return;
    };
    let event = BattleEvent::ProgressUpdated {
        context,
        actual_damage: progress.actual_damage,
        total_prevented: progress.total_prevented_damage,
        condition_met: progress.is_condition_met,
    };
    ctx.publish(event);
}

/// Drops the resolution, planned attack and progress of `context`, then
/// continues the enemy turn.
pub(crate) fn retire(ctx: &mut HandlerContext<'_>, context: ContextId) {
    if let Some(mut resolution) = ctx.battle.resolutions.remove(context) {
        resolution.advance(ResolutionStage::Retired);
        if let Some(listener) = resolution.listener {
            ctx.bus.unsubscribe(listener);
        }
    }
    ctx.state_mut().retire(context);
    enqueue_enemy_flow(ctx.queue, &ctx.battle.state);
}

/// Turns hook effects into the events that carry them out.
pub(crate) fn publish_effects(
    ctx: &mut HandlerContext<'_>,
    source: EntityId,
    effects: Vec<HookEffect>,
) {
    for effect in effects {
        let event = match effect {
            HookEffect::ApplyPassive {
                target,
                kind,
                amount,
            } => BattleEvent::ApplyPassive {
                target,
                kind,
                delta: amount,
            },
            HookEffect::DirectDamage { target, amount } => BattleEvent::DamageIntent {
                source,
                target,
                amount,
                attack: None,
                context: None,
            },
            HookEffect::Heal { target, amount } => BattleEvent::Heal { target, amount },
        };
        ctx.publish(event);
    }
}
