//! Tick-driven battle driver.
//!
//! [`Battle`] owns the shared state, the event bus, the rule queue and the
//! journal, and is the only place events are actually dispatched. Callers
//! publish inbound events and call [`Battle::tick`] once per frame.

use std::sync::Arc;

use battle_core::{AttackCatalog, BattleConfig, BattleState, ContextId, PhaseState, Roster};
use rule_queue::{Rule, Step};
use tracing::{trace, warn};

use crate::context::{BattleContext, BattleQueue, HandlerContext};
use crate::error::{BattleError, Result};
use crate::events::{
    BattleEvent, BattleEventKind, EventBus, EventHandler, EventJournal, SubscriptionId,
};
use crate::handlers::install_default_handlers;
use crate::pipeline::Resolution;

/// One battle in progress.
///
/// # Dispatch
///
/// Publishing an event delivers it to a snapshot of its subscribers taken
/// when delivery starts. Events a handler publishes are delivered
/// depth-first right after that handler returns, so everything triggered by
/// an event has been handled before [`Battle::publish`] returns. Nesting
/// deeper than `max_dispatch_depth` is dropped with a warning.
pub struct Battle {
    ctx: BattleContext,
    bus: EventBus,
    queue: BattleQueue,
    journal: EventJournal,
    max_depth: usize,
    dropped: u64,
}

impl Battle {
    pub fn builder() -> BattleBuilder {
        BattleBuilder::new()
    }

    /// Wraps `state` and installs the default handlers.
    pub fn new(state: BattleState) -> Self {
        let mut bus = EventBus::new();
        install_default_handlers(&mut bus);
        let journal = EventJournal::new(state.config.journal_capacity);
        let max_depth = state.config.max_dispatch_depth;
        Self {
            ctx: BattleContext::new(state),
            bus,
            queue: BattleQueue::new(),
            journal,
            max_depth,
            dropped: 0,
        }
    }

    /// Requests `StartBattle`, resetting all per-battle state.
    pub fn start(&mut self) {
        self.publish(BattleEvent::phase_request(battle_core::MinorPhase::StartBattle));
    }

    /// Delivers `event` and everything it triggers.
    pub fn publish(&mut self, event: BattleEvent) {
        self.dispatch(event, 0);
    }

    /// Drives the rule queue for one frame. Returns the number of rules
    /// completed.
    pub fn tick(&mut self, dt: f32) -> usize {
        let mut completed = 0;
        let mut dt = dt;
        loop {
            let step = self.queue.step(&mut self.ctx, dt);
            dt = 0.0;
            self.flush(0);
            match step {
                Step::Completed => completed += 1,
                Step::Waiting | Step::Idle => break,
            }
        }
        completed
    }

    /// Appends a caller-defined rule to the queue.
    pub fn enqueue(&mut self, rule: impl Rule<BattleContext> + 'static) {
        self.queue.enqueue(rule);
    }

    pub fn subscribe(
        &mut self,
        kind: BattleEventKind,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId {
        self.bus.subscribe(kind, handler)
    }

    pub fn subscribe_many(
        &mut self,
        kinds: &[BattleEventKind],
        handler: Arc<dyn EventHandler>,
    ) -> Vec<SubscriptionId> {
        self.bus.subscribe_many(kinds, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn state(&self) -> &BattleState {
        &self.ctx.state
    }

    pub fn state_mut(&mut self) -> &mut BattleState {
        &mut self.ctx.state
    }

    pub fn context(&self) -> &BattleContext {
        &self.ctx
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    pub fn queue(&self) -> &BattleQueue {
        &self.queue
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn phase(&self) -> PhaseState {
        self.ctx.state.phase.current()
    }

    pub fn resolution(&self, context: ContextId) -> Option<&Resolution> {
        self.ctx.resolutions.get(context)
    }

    /// Contexts waiting for presentation to publish `ImpactNow`, oldest
    /// first.
    pub fn awaiting_impacts(&self) -> Vec<ContextId> {
        self.ctx.resolutions.awaiting()
    }

    /// Number of events dropped by the depth limit.
    pub fn dropped_events(&self) -> u64 {
        self.dropped
    }

    fn dispatch(&mut self, event: BattleEvent, depth: usize) {
        self.journal.record(depth, &event);
        let kind = event.kind();
        trace!(target: "runtime::bus", %kind, depth, "dispatch");

        for (id, handler) in self.bus.snapshot(kind) {
            // Unsubscribed by an earlier handler of this same event.
            if !self.bus.is_subscribed(id) {
                continue;
            }
            let mut ctx = HandlerContext {
                battle: &mut self.ctx,
                queue: &mut self.queue,
                bus: &mut self.bus,
            };
            handler.handle(&event, &mut ctx);
            self.flush(depth + 1);
        }
    }

    fn flush(&mut self, depth: usize) {
        let pending = self.ctx.take_outbox();
        if pending.is_empty() {
            return;
        }
        if depth >= self.max_depth {
            warn!(
                target: "runtime::bus",
                depth,
                dropped = pending.len(),
                first = %pending[0].kind(),
                "dispatch depth limit reached"
            );
            self.dropped += pending.len() as u64;
            return;
        }
        for event in pending {
            self.dispatch(event, depth);
        }
    }
}

/// Builder for [`Battle`] from configuration, catalog and roster.
pub struct BattleBuilder {
    config: BattleConfig,
    catalog: AttackCatalog,
    roster: Option<Roster>,
    handlers: Vec<(BattleEventKind, Arc<dyn EventHandler>)>,
}

impl BattleBuilder {
    fn new() -> Self {
        Self {
            config: BattleConfig::default(),
            catalog: AttackCatalog::new(),
            roster: None,
            handlers: Vec::new(),
        }
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(mut self, catalog: AttackCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Subscribes `handler` after the default handlers.
    pub fn handler(mut self, kind: BattleEventKind, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push((kind, handler));
        self
    }

    /// Validates the configuration and roster, then assembles the battle.
    pub fn build(self) -> Result<Battle> {
        self.config.validate()?;
        let roster = self.roster.ok_or(BattleError::MissingRoster)?;
        let state = BattleState::new(self.config, self.catalog, roster)?;

        let mut battle = Battle::new(state);
        for (kind, handler) in self.handlers {
            battle.subscribe(kind, handler);
        }
        Ok(battle)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::events::FnHandler;
    use battle_core::{Combatant, EntityId, MinorPhase, Side};

    fn battle(config: BattleConfig) -> Battle {
        let roster =
            Roster::new(vec![Combatant::new(EntityId::PLAYER, "hero", Side::Player, 10)]).unwrap();
        Battle::builder().config(config).roster(roster).build().unwrap()
    }

    #[test]
    fn builder_requires_a_roster() {
        let result = Battle::builder().build();
        assert!(matches!(result, Err(BattleError::MissingRoster)));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let mut config = BattleConfig::default();
        config.journal_capacity = 0;
        let roster =
            Roster::new(vec![Combatant::new(EntityId::PLAYER, "hero", Side::Player, 10)]).unwrap();
        let result = Battle::builder().config(config).roster(roster).build();
        assert!(matches!(result, Err(BattleError::Config(_))));
    }

    #[test]
    fn follow_ups_are_delivered_before_later_subscribers() {
        let mut battle = battle(BattleConfig::default());
        battle.subscribe(
            BattleEventKind::Heal,
            Arc::new(FnHandler::new("echo", |_, ctx: &mut HandlerContext<'_>| {
                ctx.publish(BattleEvent::CombatantDefeated {
                    entity: EntityId(7),
                });
            })),
        );
        battle.subscribe(
            BattleEventKind::Heal,
            Arc::new(FnHandler::new("late", |_, ctx: &mut HandlerContext<'_>| {
                ctx.publish(BattleEvent::AttackHit {
                    attack: battle_core::AttackId(1),
                    hits: 0,
                });
            })),
        );

        battle.publish(BattleEvent::Heal {
            target: EntityId(42),
            amount: 1,
        });

        let kinds: Vec<_> = battle
            .journal()
            .iter()
            .map(|entry| (entry.event.kind(), entry.depth))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (BattleEventKind::Heal, 0),
                (BattleEventKind::CombatantDefeated, 1),
                (BattleEventKind::AttackHit, 1),
            ]
        );
    }

    #[test]
    fn handler_unsubscribed_mid_dispatch_is_skipped() {
        let mut battle = battle(BattleConfig::default());
        let victim = Rc::new(Cell::new(None::<SubscriptionId>));

        let target = Rc::clone(&victim);
        battle.subscribe(
            BattleEventKind::Heal,
            Arc::new(FnHandler::new("remover", move |_, ctx: &mut HandlerContext<'_>| {
                if let Some(id) = target.get() {
                    ctx.bus.unsubscribe(id);
                }
            })),
        );
        let id = battle.subscribe(
            BattleEventKind::Heal,
            Arc::new(FnHandler::new("victim", |_, ctx: &mut HandlerContext<'_>| {
                ctx.publish(BattleEvent::AttackHit {
                    attack: battle_core::AttackId(1),
                    hits: 0,
                });
            })),
        );
        victim.set(Some(id));

        battle.publish(BattleEvent::Heal {
            target: EntityId(42),
            amount: 1,
        });
        assert_eq!(battle.journal().count(BattleEventKind::AttackHit), 0);
        assert!(!battle.bus().is_subscribed(id));
    }

    #[test]
    fn runaway_chains_stop_at_the_depth_limit() {
        let mut config = BattleConfig::default();
        config.max_dispatch_depth = 4;
        let mut battle = battle(config);
        battle.subscribe(
            BattleEventKind::Heal,
            Arc::new(FnHandler::new("loop", |event, ctx: &mut HandlerContext<'_>| {
                ctx.publish(event.clone());
            })),
        );

        battle.publish(BattleEvent::Heal {
            target: EntityId(42),
            amount: 1,
        });
        assert_eq!(battle.journal().count(BattleEventKind::Heal), 4);
        assert_eq!(battle.dropped_events(), 1);
    }

    #[test]
    fn start_resets_to_pre_battle() {
        let mut battle = battle(BattleConfig::default());
        battle.publish(BattleEvent::phase_request(MinorPhase::Action));
        battle.start();
        assert_eq!(battle.phase().minor, MinorPhase::StartBattle);
        assert_eq!(battle.phase().turn, 0);
    }
}
