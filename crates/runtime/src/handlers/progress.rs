use battle_core::{ContextId, ProgressFields};
use tracing::trace;

use crate::context::HandlerContext;
use crate::events::{BattleEvent, EventHandler};
use crate::pipeline::publish_progress;

/// Feeds block assignments and modifier changes into the progress tracker.
#[derive(Debug, Default)]
pub struct ProgressHandler;

impl EventHandler for ProgressHandler {
    fn name(&self) -> &'static str {
        "progress"
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        let state = ctx.state_mut();
        let (context, fields): (ContextId, Option<ProgressFields>) = match event {
            BattleEvent::BlockAssigned {
                context,
                color,
                delta,
            } => (*context, state.assign_block(*context, *color, *delta)),
            BattleEvent::BlockRemoved {
                context,
                color,
                delta,
            } => (*context, state.remove_block(*context, *color, *delta)),
            BattleEvent::ModifyBlock {
                context,
                delta,
                reason,
            } => (*context, state.modify_block(*context, *delta, reason.clone())),
            BattleEvent::RemoveBlockModifier { context, reason } => {
                (*context, state.remove_block_modifier(*context, reason))
            }
            BattleEvent::ModifyDamage {
                context,
                delta,
                reason,
            } => (*context, state.modify_damage(*context, *delta, reason.clone())),
            BattleEvent::RemoveDamageModifier { context, reason } => {
                (*context, state.remove_damage_modifier(*context, reason))
            }
            _ => return,
        };

        let Some(fields) = fields else {
            trace!(
                target: "runtime::progress",
                %context,
                kind = %event.kind(),
                "no planned attack"
            );
            return;
        };
        publish_progress(ctx, context, fields);
    }
}
