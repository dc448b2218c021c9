//! Rules the engine enqueues on the battle's [`BattleQueue`].

use battle_core::{BattleState, ContextId, MajorPhase, MinorPhase};
use rule_queue::{Rule, RuleState, Timeout, WaitUntil};
use tracing::debug;

use crate::context::{BattleContext, BattleQueue};
use crate::events::BattleEvent;

/// Publishes a phase-change request when it reaches the head of the queue.
#[derive(Clone, Copy, Debug)]
pub struct RequestPhase {
    target: MinorPhase,
}

impl RequestPhase {
    pub fn new(target: MinorPhase) -> Self {
        Self { target }
    }
}

impl Rule<BattleContext> for RequestPhase {
    fn name(&self) -> &str {
        self.target.as_ref()
    }

    fn start(&mut self, ctx: &mut BattleContext) -> RuleState {
        ctx.publish(BattleEvent::phase_request(self.target));
        RuleState::Complete
    }
}

/// Waits until the resolution of `context` has retired.
///
/// With a `timeout`, the wait gives up after that many seconds and publishes
/// `ImpactNow` for the context itself.
pub fn await_impact(context: ContextId, timeout: Option<f32>) -> Box<dyn Rule<BattleContext>> {
    let wait = WaitUntil::new("await_impact", move |ctx: &BattleContext| {
        !ctx.resolutions.contains(context)
    });
    match timeout {
        Some(limit) => Box::new(Timeout::new(Box::new(wait), limit, move |ctx: &mut BattleContext| {
            ctx.publish(BattleEvent::ImpactNow { context });
        })),
        None => Box::new(wait),
    }
}

/// Enqueues the phase requests that continue the enemy turn.
///
/// - Attacks left: PreBlock then Block for the next one
/// - Otherwise: EnemyEnd then PlayerStart
///
/// Does nothing outside the enemy turn, or when the battle is configured
/// to leave sequencing to the caller.
pub fn enqueue_enemy_flow(queue: &mut BattleQueue, state: &BattleState) {
    if !state.config.auto_advance_enemy_turn
        || state.phase.current().major != MajorPhase::EnemyTurn
    {
        return;
    }
    let next = if state.roster.has_planned() {
        [MinorPhase::PreBlock, MinorPhase::Block]
    } else {
        [MinorPhase::EnemyEnd, MinorPhase::PlayerStart]
    };
    debug!(target: "runtime::rules", first = %next[0], second = %next[1], "enemy flow queued");
    for target in next {
        queue.enqueue(RequestPhase::new(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Resolution;
    use battle_core::{AttackCatalog, AttackId, BattleConfig, Combatant, EntityId, Roster, Side};

    fn context() -> BattleContext {
        let roster = Roster::new(vec![Combatant::new(EntityId::PLAYER, "hero", Side::Player, 10)])
            .unwrap();
        BattleContext::new(
            BattleState::new(BattleConfig::default(), AttackCatalog::new(), roster).unwrap(),
        )
    }

    #[test]
    fn empty_roster_flows_to_player_turn() {
        let mut ctx = context();
        ctx.state.phase.request(MinorPhase::EnemyStart);
        let mut queue = BattleQueue::new();
        enqueue_enemy_flow(&mut queue, &ctx.state);
        assert_eq!(queue.pending_names().collect::<Vec<_>>(), vec!["enemy_end", "player_start"]);

        queue.tick(&mut ctx, 0.0);
        assert_eq!(
            ctx.take_outbox(),
            vec![
                BattleEvent::phase_request(MinorPhase::EnemyEnd),
                BattleEvent::phase_request(MinorPhase::PlayerStart),
            ]
        );
    }

    #[test]
    fn manual_sequencing_enqueues_nothing() {
        let mut ctx = context();
        ctx.state.phase.request(MinorPhase::EnemyStart);
        ctx.state.config.auto_advance_enemy_turn = false;
        let mut queue = BattleQueue::new();
        enqueue_enemy_flow(&mut queue, &ctx.state);
        assert!(queue.is_empty());
    }

    #[test]
    fn player_turn_enqueues_nothing() {
        let mut ctx = context();
        ctx.state.phase.request(MinorPhase::Action);
        let mut queue = BattleQueue::new();
        enqueue_enemy_flow(&mut queue, &ctx.state);
        assert!(queue.is_empty());
    }

    #[test]
    fn timed_out_impact_wait_publishes_impact() {
        let mut ctx = context();
        ctx.resolutions.insert(Resolution::new(
            ContextId(5),
            EntityId(1),
            EntityId::PLAYER,
            AttackId(1),
        ));
        let mut queue = BattleQueue::new();
        queue.enqueue_boxed(await_impact(ContextId(5), Some(1.0)));

        // The starting tick does not count towards the limit.
        queue.tick(&mut ctx, 0.6);
        queue.tick(&mut ctx, 0.6);
        assert!(queue.is_waiting());
        assert!(!ctx.has_pending());

        queue.tick(&mut ctx, 0.6);
        assert!(queue.is_empty());
        assert_eq!(
            ctx.take_outbox(),
            vec![BattleEvent::ImpactNow {
                context: ContextId(5)
            }]
        );
    }
}
