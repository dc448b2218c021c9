//! Mutable state shared by handlers and queued rules.

use battle_core::BattleState;
use rule_queue::RuleQueue;

use crate::events::{BattleEvent, EventBus};
use crate::pipeline::Resolutions;

/// State every rule and handler works on.
///
/// Events published here are buffered in an outbox and dispatched by the
/// [`Battle`](crate::Battle) driver as soon as the current handler or rule
/// returns.
pub struct BattleContext {
    pub state: BattleState,
    pub resolutions: Resolutions,
    outbox: Vec<BattleEvent>,
}

impl BattleContext {
    pub fn new(state: BattleState) -> Self {
        Self {
            state,
            resolutions: Resolutions::new(),
            outbox: Vec::new(),
        }
    }

    /// Buffers `event` for dispatch once the caller returns.
    pub fn publish(&mut self, event: BattleEvent) {
        self.outbox.push(event);
    }

    pub(crate) fn take_outbox(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn has_pending(&self) -> bool {
        !self.outbox.is_empty()
    }
}

/// Rule queue specialized for battles.
pub type BattleQueue = RuleQueue<BattleContext>;

/// Everything a handler may touch while reacting to one event.
pub struct HandlerContext<'a> {
    pub battle: &'a mut BattleContext,
    pub queue: &'a mut BattleQueue,
    pub bus: &'a mut EventBus,
}

impl HandlerContext<'_> {
    pub fn publish(&mut self, event: BattleEvent) {
        self.battle.publish(event);
    }

    pub fn state(&self) -> &BattleState {
        &self.battle.state
    }

    pub fn state_mut(&mut self) -> &mut BattleState {
        &mut self.battle.state
    }
}
