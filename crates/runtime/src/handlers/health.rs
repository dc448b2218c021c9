use battle_core::Side;
use tracing::info;

use crate::context::HandlerContext;
use crate::events::{BattleEvent, EventHandler};
use crate::rules::enqueue_enemy_flow;

/// Restores HP, capped at the combatant's maximum.
#[derive(Debug, Default)]
pub struct HealHandler;

impl EventHandler for HealHandler {
    fn name(&self) -> &'static str {
        "heal"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let BattleEvent::Heal { target, amount } = *event else {
            return;
        };
        let Some(combatant) = ctx.state_mut().roster.get_mut(target) else {
            return;
        };
        if !combatant.is_alive() {
            return;
        }
        let gained = combatant.heal(amount);
        let hp = combatant.hp;
        if gained > 0 {
            ctx.publish(BattleEvent::HpChanged {
                target,
                delta: i32::try_from(gained).unwrap_or(i32::MAX),
                hp,
            });
        }
    }
}

/// Tears down whatever a defeated combatant still had in flight.
///
/// The rule queue is always cleared. For an enemy, its impact subscriptions
/// are released and its planned attacks and progress records destroyed; the
/// enemy turn then continues with whoever is left.
#[derive(Debug, Default)]
pub struct DefeatHandler;

impl EventHandler for DefeatHandler {
    fn name(&self) -> &'static str {
        "defeat"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let BattleEvent::CombatantDefeated { entity } = *event else {
            return;
        };
        let discarded = ctx.queue.clear();
        let Some(side) = ctx.state().roster.get(entity).map(|c| c.side) else {
            return;
        };
        if side == Side::Player {
            info!(target: "runtime::defeat", %entity, discarded, "player defeated");
            return;
        }

        for context in ctx.battle.resolutions.of_attacker(entity) {
            let listener = ctx
                .battle
                .resolutions
                .remove(context)
                .and_then(|resolution| resolution.listener);
            if let Some(listener) = listener {
                ctx.bus.unsubscribe(listener);
            }
        }
        let dropped = ctx.state_mut().drop_plans_of(entity);
        info!(
            target: "runtime::defeat",
            %entity,
            discarded,
            dropped = dropped.len(),
            "enemy defeated"
        );

        if ctx.battle.resolutions.awaiting().is_empty() {
            enqueue_enemy_flow(ctx.queue, &ctx.battle.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BattleContext, BattleQueue};
    use crate::events::EventBus;
    use battle_core::{AttackCatalog, BattleConfig, BattleState, Combatant, EntityId, Roster};

    fn battle() -> BattleContext {
        let roster = Roster::new(vec![
            Combatant::new(EntityId::PLAYER, "hero", Side::Player, 20),
            Combatant::new(EntityId(1), "rat", Side::Enemy, 5),
        ])
        .unwrap();
        BattleContext::new(
            BattleState::new(BattleConfig::default(), AttackCatalog::new(), roster).unwrap(),
        )
    }

    #[test]
    fn heal_is_capped_at_max_hp() {
        let mut battle = battle();
        battle.state.roster.get_mut(EntityId::PLAYER).unwrap().take_damage(4);

        let mut queue = BattleQueue::new();
        let mut bus = EventBus::new();
        let mut ctx = HandlerContext {
            battle: &mut battle,
            queue: &mut queue,
            bus: &mut bus,
        };
        HealHandler.handle(
            &BattleEvent::Heal {
                target: EntityId::PLAYER,
                amount: 10,
            },
            &mut ctx,
        );
        assert_eq!(
            battle.take_outbox(),
            vec![BattleEvent::HpChanged {
                target: EntityId::PLAYER,
                delta: 4,
                hp: 20,
            }]
        );
    }

    #[test]
    fn player_defeat_clears_the_queue() {
        let mut battle = battle();
        let mut queue = BattleQueue::new();
        queue.enqueue(crate::rules::RequestPhase::new(battle_core::MinorPhase::PlayerStart));
        let mut bus = EventBus::new();
        let mut ctx = HandlerContext {
            battle: &mut battle,
            queue: &mut queue,
            bus: &mut bus,
        };
        DefeatHandler.handle(
            &BattleEvent::CombatantDefeated {
                entity: EntityId::PLAYER,
            },
            &mut ctx,
        );
        assert!(queue.is_empty());
    }
}
