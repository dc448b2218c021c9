use battle_core::{EntityId, PassiveKind};
use tracing::debug;

use crate::context::HandlerContext;
use crate::events::{BattleEvent, EventHandler};
use crate::pipeline::publish_progress;

/// Mutates passive ledgers and keeps progress snapshots in step with them.
///
/// Prevention changes shift the aegis snapshot of every live record the
/// combatant defends; corrosion changes replace its block penalty. Records
/// never read the ledger during recompute.
#[derive(Debug, Default)]
pub struct PassiveHandler;

enum Change {
    Shift(i32),
    Removed,
}

impl EventHandler for PassiveHandler {
    fn name(&self) -> &'static str {
        "passive"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let (target, kind) = match *event {
            BattleEvent::ApplyPassive { target, kind, .. }
            | BattleEvent::RemovePassive { target, kind }
            | BattleEvent::UpdatePassive { target, kind, .. } => (target, kind),
            _ => return,
        };
        let Some(combatant) = ctx.state_mut().roster.get_mut(target) else {
            return;
        };

        let passives = &mut combatant.passives;
        let before = passives.amount(kind);
        let (amount, change) = match *event {
            BattleEvent::ApplyPassive { delta, .. } => {
                let amount = passives.apply(kind, delta);
                (amount, Change::Shift(signed_delta(before, amount)))
            }
            BattleEvent::UpdatePassive { delta, .. } => {
                let amount = passives.update(kind, delta);
                (amount, Change::Shift(signed_delta(before, amount)))
            }
            _ => {
                passives.remove(kind);
                (0, Change::Removed)
            }
        };
        if amount == before {
            return;
        }

        debug!(target: "runtime::passive", %target, %kind, before, amount, "passive changed");
        ctx.publish(BattleEvent::PassiveChanged {
            target,
            kind,
            amount,
        });
        sync_progress(ctx, target, kind, amount, change);
    }
}

fn signed_delta(before: u32, after: u32) -> i32 {
    let delta = i64::from(after) - i64::from(before);
    delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn sync_progress(
    ctx: &mut HandlerContext<'_>,
    target: EntityId,
    kind: PassiveKind,
    amount: u32,
    change: Change,
) {
    let state = ctx.state_mut();
    let updated = match (kind, change) {
        (PassiveKind::Aegis, Change::Shift(delta)) => state.adjust_aegis(target, delta),
        (PassiveKind::Aegis, Change::Removed) => state.reset_aegis(target),
        (PassiveKind::Corrosion, _) => state.set_corrosion(target, amount),
        (PassiveKind::Stealth, _) => return,
    };
    for (context, fields) in updated {
        publish_progress(ctx, context, fields);
    }
}
