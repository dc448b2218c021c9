//! Synchronous, kind-keyed publish/subscribe.
//!
//! The bus only stores subscriptions. Delivery is driven by
//! [`Battle`](crate::Battle), which owns the state handlers mutate and
//! dispatches each event to a snapshot of the subscriber list taken when
//! dispatch of that event begins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::{BattleEvent, BattleEventKind};
use crate::context::HandlerContext;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// Reacts to events of the kinds it was subscribed to.
///
/// Handlers run synchronously. Follow-up events go through
/// [`HandlerContext::publish`] and are delivered right after the handler
/// returns, before any other subscriber of the current event.
pub trait EventHandler {
    /// Returns a human-readable name for this handler (used in logging).
    fn name(&self) -> &'static str;

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>);
}

/// Adapts a closure into an [`EventHandler`].
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&BattleEvent, &mut HandlerContext<'_>),
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&BattleEvent, &mut HandlerContext<'_>),
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(&self, event: &BattleEvent, ctx: &mut HandlerContext<'_>) {
        (self.f)(event, ctx)
    }
}

struct Subscription {
    id: SubscriptionId,
    handler: Arc<dyn EventHandler>,
}

/// Subscriber table keyed by [`BattleEventKind`].
///
/// Subscribers of one kind are kept in registration order, which is the
/// order they receive events in.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<BattleEventKind, Vec<Subscription>>,
    index: HashMap<SubscriptionId, BattleEventKind>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: BattleEventKind,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        debug!(target: "runtime::bus", %id, %kind, handler = handler.name(), "subscribe");
        self.handlers
            .entry(kind)
            .or_default()
            .push(Subscription { id, handler });
        self.index.insert(id, kind);
        id
    }

    /// Registers one handler for several kinds.
    pub fn subscribe_many(
        &mut self,
        kinds: &[BattleEventKind],
        handler: Arc<dyn EventHandler>,
    ) -> Vec<SubscriptionId> {
        kinds
            .iter()
            .map(|&kind| self.subscribe(kind, Arc::clone(&handler)))
            .collect()
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(kind) = self.index.remove(&id) else {
            return false;
        };
        if let Some(subscriptions) = self.handlers.get_mut(&kind) {
            subscriptions.retain(|subscription| subscription.id != id);
        }
        debug!(target: "runtime::bus", %id, %kind, "unsubscribe");
        true
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.index.contains_key(&id)
    }

    /// Current subscribers of `kind`, in delivery order.
    pub fn snapshot(&self, kind: BattleEventKind) -> Vec<(SubscriptionId, Arc<dyn EventHandler>)> {
        let subscribers: Vec<_> = self
            .handlers
            .get(&kind)
            .map(|subscriptions| {
                subscriptions
                    .iter()
                    .map(|s| (s.id, Arc::clone(&s.handler)))
                    .collect()
            })
            .unwrap_or_default();
        trace!(target: "runtime::bus", %kind, subscribers = subscribers.len(), "snapshot");
        subscribers
    }

    pub fn subscriber_count(&self, kind: BattleEventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Handler names per kind (for debugging).
    pub fn handler_names(&self, kind: BattleEventKind) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|s| s.handler.name())
    }
}
