//! Handlers driving one context through resolution and impact.

use std::sync::Arc;

use battle_core::{ContextId, HookArgs, PassiveKind, absorb};
use tracing::{debug, info, warn};

use super::{
    Resolution, ResolutionStage, apply_direct_damage, apply_hp_damage, consume_aegis,
    publish_effects, publish_progress, retire,
};
use crate::context::HandlerContext;
use crate::events::{BattleEvent, BattleEventKind, EventHandler};
use crate::rules::await_impact;

/// Starts resolving the planned attack named by `ResolveAttack`.
///
/// Freezes the blocking decision and condition result, subscribes an
/// [`ImpactListener`] for the context and queues the impact wait. Requests
/// for contexts without a planned attack are ignored.
#[derive(Debug, Default)]
pub struct ResolveAttackHandler;

impl EventHandler for ResolveAttackHandler {
    fn name(&self) -> &'static str {
        "resolve_attack"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let BattleEvent::ResolveAttack { context } = *event else {
            return;
        };
        if ctx.battle.resolutions.contains(context) {
            debug!(target: "runtime::pipeline", %context, "already resolving");
            return;
        }

        let state = ctx.state_mut();
        if state.progress_or_create(context).is_none() {
            debug!(target: "runtime::pipeline", %context, "no planned attack to resolve");
            return;
        }
        let fields = state.recompute(context).unwrap_or_default();
        let Some(progress) = state.progress(context) else {
            return;
        };
        let blocked = progress.is_blocked();
        let condition_met = progress.is_condition_met;
        let base_damage = progress.base_damage;
        let fully_prevented = progress.fully_prevented;
        let attacker = progress.attacker;
        let target = progress.defender;

        let Some(planned) = state.roster.planned_mut(context) else {
            return;
        };
        planned.was_blocked = blocked;
        let attack = planned.attack_id;
        publish_progress(ctx, context, fields);

        let listener = ctx.bus.subscribe(
            BattleEventKind::ImpactNow,
            Arc::new(ImpactListener::new(context)),
        );
        let mut resolution = Resolution::new(context, attacker, target, attack);
        resolution.blocked_at_resolution = blocked;
        resolution.condition_met = condition_met;
        resolution.hit_attack = (!blocked).then_some(attack);
        resolution.listener = Some(listener);
        resolution.advance(ResolutionStage::AwaitingImpact);
        ctx.battle.resolutions.insert(resolution);

        let timeout = ctx.state().config.impact_timeout;
        ctx.queue.enqueue_boxed(await_impact(context, timeout));

        info!(
            target: "runtime::pipeline",
            %context,
            %attack,
            %attacker,
            blocked,
            condition_met,
            base_damage,
            "attack resolving"
        );

        if base_damage > 0 && !fully_prevented {
            ctx.publish(BattleEvent::DamageIntent {
                source: attacker,
                target,
                amount: base_damage,
                attack: (!blocked).then_some(attack),
                context: Some(context),
            });
        }
    }
}

/// Folds damage intents into the impact they belong to, or applies them at
/// once when no impact is pending.
///
/// Routing:
/// - An explicit context that is awaiting impact collects the damage
/// - No context: the oldest impact awaiting on the same target collects it
/// - Anything else lands immediately
#[derive(Debug, Default)]
pub struct DamageIntentHandler;

impl EventHandler for DamageIntentHandler {
    fn name(&self) -> &'static str {
        "damage_intent"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let BattleEvent::DamageIntent {
            source,
            target,
            amount,
            attack,
            context,
        } = *event
        else {
            return;
        };

        let resolutions = &mut ctx.battle.resolutions;
        let routed = match context {
            Some(context) if resolutions.is_awaiting(context) => Some(context),
            Some(_) => None,
            None => resolutions.awaiting_for_target(target),
        };

        if let Some(resolution) = routed.and_then(|c| resolutions.get_mut(c)) {
            resolution.pending_damage = resolution.pending_damage.saturating_add(amount);
            resolution.intents += 1;
            resolution.hit_attack = resolution.hit_attack.or(attack);
            debug!(
                target: "runtime::pipeline",
                context = %resolution.context,
                %source,
                amount,
                pending = resolution.pending_damage,
                "damage intent pending"
            );
            return;
        }

        debug!(target: "runtime::pipeline", %source, %target, amount, "direct damage");
        apply_direct_damage(ctx, target, amount);
        if let Some(attack) = attack {
            let hits = ctx.state_mut().record_hit(attack);
            ctx.publish(BattleEvent::AttackHit { attack, hits });
        }
    }
}

/// Applies the pending damage of one context when its `ImpactNow` arrives.
///
/// Subscribed by [`ResolveAttackHandler`] and unsubscribed as soon as the
/// impact lands or the resolution is discarded.
#[derive(Debug)]
pub struct ImpactListener {
    context: ContextId,
}

impl ImpactListener {
    pub fn new(context: ContextId) -> Self {
        Self { context }
    }
}

impl EventHandler for ImpactListener {
    fn name(&self) -> &'static str {
        "impact_listener"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let BattleEvent::ImpactNow { context } = *event else {
            return;
        };
        if context != self.context {
            return;
        }
        let Some(resolution) = ctx.battle.resolutions.get_mut(context) else {
            return;
        };
        if !resolution.is_awaiting() {
            warn!(
                target: "runtime::pipeline",
                %context,
                stage = %resolution.stage,
                "impact outside awaiting stage"
            );
            return;
        }
        resolution.advance(ResolutionStage::Applied);
        let resolution = resolution.clone();

        let block = ctx
            .state()
            .progress(context)
            .map_or(0, |p| p.assigned_block_total);
        let aegis = ctx
            .state()
            .roster
            .get(resolution.target)
            .map_or(0, |c| c.passives.amount(PassiveKind::Aegis));
        let absorption = absorb(resolution.pending_damage, block, aegis);

        consume_aegis(ctx, resolution.target, absorption.absorbed_by_passive);
        apply_hp_damage(ctx, resolution.target, absorption.to_hp);

        let was_hit = absorption.reached_hp() || resolution.pending_damage == 0;
        info!(
            target: "runtime::pipeline",
            %context,
            pending = resolution.pending_damage,
            intents = resolution.intents,
            absorbed_by_block = absorption.absorbed_by_block,
            absorbed_by_passive = absorption.absorbed_by_passive,
            to_hp = absorption.to_hp,
            "impact applied"
        );

        if let Some(attack) = resolution.hit_attack {
            let hits = ctx.state_mut().record_hit(attack);
            ctx.publish(BattleEvent::AttackHit { attack, hits });
        }

        if was_hit && !resolution.blocked_at_resolution {
            let definition = ctx
                .state()
                .planned(context)
                .map(|planned| Arc::clone(&planned.definition));
            if let Some(definition) = definition {
                let effects = definition.hooks.run_on_hit(&HookArgs {
                    attack: resolution.attack,
                    context,
                    source: resolution.attacker,
                    target: resolution.target,
                    condition_met: resolution.condition_met,
                });
                publish_effects(ctx, resolution.attacker, effects);
            }
        }

        ctx.publish(BattleEvent::AttackResolved {
            context,
            attack: resolution.attack,
            condition_met: resolution.condition_met,
        });
        retire(ctx, context);
    }
}
