use std::sync::Arc;

use battle_core::{HookArgs, MinorPhase};
use tracing::{debug, info, warn};

use crate::context::HandlerContext;
use crate::events::{BattleEvent, EventHandler};
use crate::pipeline::publish_effects;
use crate::rules::enqueue_enemy_flow;

/// Applies phase-change requests and runs the work tied to entering a phase.
///
/// | Phase | Work |
/// |---|---|
/// | `StartBattle` | discard queued rules and resolutions, reset battle state |
/// | `EnemyStart` | plan the turn, queue the enemy flow |
/// | `PreBlock` | reveal the next planned attack |
/// | `EnemyAttack` | request resolution of the revealed attack |
#[derive(Debug, Default)]
pub struct PhaseHandler;

impl EventHandler for PhaseHandler {
    fn name(&self) -> &'static str {
        "phase"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let BattleEvent::RequestPhaseChange { target } = *event else {
            return;
        };

        if target == MinorPhase::StartBattle {
            start_battle(ctx);
        }

        let transition = ctx.state_mut().phase.request(target);
        if !transition.expected {
            warn!(
                target: "runtime::phase",
                from = %transition.previous.minor,
                to = %target,
                "unexpected phase transition applied"
            );
        }
        debug!(
            target: "runtime::phase",
            from = %transition.previous.minor,
            to = %target,
            turn = transition.current.turn,
            "phase changed"
        );
        ctx.publish(BattleEvent::PhaseChanged {
            previous: transition.previous,
            current: transition.current,
        });

        match target {
            MinorPhase::EnemyStart => plan_enemy_turn(ctx, transition.current.turn),
            MinorPhase::PreBlock => reveal_next(ctx),
            MinorPhase::EnemyAttack => resolve_next(ctx),
            _ => {}
        }
    }
}

fn start_battle(ctx: &mut HandlerContext<'_>) {
    let discarded = ctx.queue.clear();
    for listener in ctx.battle.resolutions.clear() {
        ctx.bus.unsubscribe(listener);
    }
    ctx.state_mut().reset_for_battle();
    info!(target: "runtime::phase", discarded, "battle started");
}

fn plan_enemy_turn(ctx: &mut HandlerContext<'_>, turn: u32) {
    for notice in ctx.state_mut().plan_turn(turn) {
        ctx.publish(BattleEvent::PlannedAttack {
            attacker: notice.attacker,
            attack: notice.attack,
            context: notice.context,
            step: notice.step,
            turn: notice.turn,
            telegraph: notice.telegraph,
            preview: notice.preview,
            ambush: notice.is_ambush,
        });
    }
    enqueue_enemy_flow(ctx.queue, &ctx.battle.state);
}

/// Reveals the next planned attack. On-reveal hooks fire once per context,
/// however often PreBlock is re-entered.
fn reveal_next(ctx: &mut HandlerContext<'_>) {
    let Some((attacker, context)) = ctx.state().roster.next_planned() else {
        debug!(target: "runtime::phase", "nothing to reveal");
        return;
    };
    let condition_met = ctx
        .state()
        .progress(context)
        .is_some_and(|p| p.is_condition_met);
    let Some(planned) = ctx.state_mut().roster.planned_mut(context) else {
        return;
    };
    let first_reveal = !planned.revealed;
    planned.revealed = true;
    let attack = planned.attack_id;
    let target = planned.target;
    let definition = Arc::clone(&planned.definition);

    ctx.publish(BattleEvent::AttackRevealed {
        attacker,
        attack,
        context,
    });

    if first_reveal {
        let effects = definition.hooks.run_on_reveal(&HookArgs {
            attack,
            context,
            source: attacker,
            target,
            condition_met,
        });
        publish_effects(ctx, attacker, effects);
    }
}

fn resolve_next(ctx: &mut HandlerContext<'_>) {
    match ctx.state().roster.next_planned() {
        Some((_, context)) => ctx.publish(BattleEvent::ResolveAttack { context }),
        None => enqueue_enemy_flow(ctx.queue, &ctx.battle.state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BattleContext, BattleQueue};
    use crate::events::EventBus;
    use battle_core::{
        AttackCatalog, AttackDefinition, AttackId, BattleConfig, BattleState, Combatant, EntityId,
        MajorPhase, Repertoire, Roster, SelectionMode, Side,
    };

    fn fixture() -> (BattleContext, BattleQueue, EventBus) {
        let mut catalog = AttackCatalog::new();
        catalog
            .register(AttackDefinition::new(AttackId(1), "bite", 4))
            .unwrap();
        let roster = Roster::new(vec![
            Combatant::new(EntityId::PLAYER, "hero", Side::Player, 30),
            Combatant::new(EntityId(1), "wolf", Side::Enemy, 12).with_repertoire(Repertoire::new(
                vec![vec![AttackId(1), AttackId(1)]],
                SelectionMode::Cycle,
            )),
        ])
        .unwrap();
        let state = BattleState::new(BattleConfig::default(), catalog, roster).unwrap();
        (BattleContext::new(state), BattleQueue::new(), EventBus::new())
    }

    fn request(
        battle: &mut BattleContext,
        queue: &mut BattleQueue,
        bus: &mut EventBus,
        target: MinorPhase,
    ) {
        let mut ctx = HandlerContext { battle, queue, bus };
        PhaseHandler.handle(&BattleEvent::phase_request(target), &mut ctx);
    }

    #[test]
    fn enemy_start_plans_and_queues_the_first_reveal() {
        let (mut battle, mut queue, mut bus) = fixture();
        request(&mut battle, &mut queue, &mut bus, MinorPhase::EnemyStart);

        let phase = battle.state.phase.current();
        assert_eq!(phase.major, MajorPhase::EnemyTurn);
        assert_eq!(phase.turn, 1);

        let outbox = battle.take_outbox();
        assert!(matches!(outbox[0], BattleEvent::PhaseChanged { .. }));
        let planned = outbox
            .iter()
            .filter(|e| matches!(e, BattleEvent::PlannedAttack { preview: false, .. }))
            .count();
        assert_eq!(planned, 2);
        assert_eq!(
            queue.pending_names().collect::<Vec<_>>(),
            vec!["pre_block", "block"]
        );
    }

    #[test]
    fn reveal_marks_only_the_first_attack() {
        let (mut battle, mut queue, mut bus) = fixture();
        request(&mut battle, &mut queue, &mut bus, MinorPhase::EnemyStart);
        battle.take_outbox();
        request(&mut battle, &mut queue, &mut bus, MinorPhase::PreBlock);

        let revealed: Vec<_> = battle
            .take_outbox()
            .into_iter()
            .filter(|e| matches!(e, BattleEvent::AttackRevealed { .. }))
            .collect();
        assert_eq!(revealed.len(), 1);

        let wolf = battle.state.roster.get(EntityId(1)).unwrap();
        let flags: Vec<_> = wolf.intent.iter().map(|p| p.revealed).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn enemy_attack_requests_resolution_of_the_next_attack() {
        let (mut battle, mut queue, mut bus) = fixture();
        request(&mut battle, &mut queue, &mut bus, MinorPhase::EnemyStart);
        let (_, first) = battle.state.roster.next_planned().unwrap();
        battle.take_outbox();

        request(&mut battle, &mut queue, &mut bus, MinorPhase::EnemyAttack);
        let outbox = battle.take_outbox();
        assert_eq!(outbox[1], BattleEvent::ResolveAttack { context: first });
    }

    #[test]
    fn start_battle_resets_turn_and_queue() {
        let (mut battle, mut queue, mut bus) = fixture();
        request(&mut battle, &mut queue, &mut bus, MinorPhase::EnemyStart);
        assert!(!queue.is_empty());

        request(&mut battle, &mut queue, &mut bus, MinorPhase::StartBattle);
        assert!(queue.is_empty());
        assert_eq!(battle.state.phase.current().turn, 0);
        assert!(!battle.state.roster.has_planned());
        assert_eq!(battle.state.planner.last_planned_turn(), None);
    }
}
