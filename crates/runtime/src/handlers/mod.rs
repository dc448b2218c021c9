//! Default event handlers.
//!
//! [`install_default_handlers`] wires the engine's own reactions to inbound
//! events. Callers may subscribe additional handlers afterwards; those run
//! after the defaults for the same kind.

mod health;
mod passive;
mod phase;
mod progress;

pub use health::{DefeatHandler, HealHandler};
pub use passive::PassiveHandler;
pub use phase::PhaseHandler;
pub use progress::ProgressHandler;

use std::sync::Arc;

use crate::events::{BattleEventKind, EventBus, SubscriptionId};
use crate::pipeline::{DamageIntentHandler, ResolveAttackHandler};

/// Subscribes every built-in handler. Returns the subscriptions created.
pub fn install_default_handlers(bus: &mut EventBus) -> Vec<SubscriptionId> {
    let mut ids = Vec::new();

    ids.push(bus.subscribe(BattleEventKind::RequestPhaseChange, Arc::new(PhaseHandler)));
    ids.push(bus.subscribe(BattleEventKind::ResolveAttack, Arc::new(ResolveAttackHandler)));
    ids.push(bus.subscribe(BattleEventKind::DamageIntent, Arc::new(DamageIntentHandler)));
    ids.extend(bus.subscribe_many(
        &[
            BattleEventKind::BlockAssigned,
            BattleEventKind::BlockRemoved,
            BattleEventKind::ModifyBlock,
            BattleEventKind::RemoveBlockModifier,
            BattleEventKind::ModifyDamage,
            BattleEventKind::RemoveDamageModifier,
        ],
        Arc::new(ProgressHandler),
    ));
    ids.extend(bus.subscribe_many(
        &[
            BattleEventKind::ApplyPassive,
            BattleEventKind::RemovePassive,
            BattleEventKind::UpdatePassive,
        ],
        Arc::new(PassiveHandler),
    ));
    ids.push(bus.subscribe(BattleEventKind::Heal, Arc::new(HealHandler)));
    ids.push(bus.subscribe(BattleEventKind::CombatantDefeated, Arc::new(DefeatHandler)));

    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_inbound_kind_has_a_handler() {
        let mut bus = EventBus::new();
        install_default_handlers(&mut bus);

        for kind in [
            BattleEventKind::RequestPhaseChange,
            BattleEventKind::ResolveAttack,
            BattleEventKind::BlockAssigned,
            BattleEventKind::BlockRemoved,
            BattleEventKind::ModifyBlock,
            BattleEventKind::RemoveBlockModifier,
            BattleEventKind::ModifyDamage,
            BattleEventKind::RemoveDamageModifier,
            BattleEventKind::ApplyPassive,
            BattleEventKind::RemovePassive,
            BattleEventKind::UpdatePassive,
            BattleEventKind::DamageIntent,
            BattleEventKind::Heal,
        ] {
            assert_eq!(bus.subscriber_count(kind), 1, "{kind}");
        }
        // Impact listeners are per resolution.
        assert_eq!(bus.subscriber_count(BattleEventKind::ImpactNow), 0);
    }
}
