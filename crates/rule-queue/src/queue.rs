//! FIFO rule driver.
//!
//! The [`RuleQueue`] owns pending rules plus at most one active rule. It is
//! driven from the outside, once per tick, and never blocks.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{Rule, RuleState};

/// Outcome of a single [`RuleQueue::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Nothing was queued.
    Idle,
    /// The head rule is waiting; later rules stay untouched.
    Waiting,
    /// A rule completed. The caller may step again within the same tick.
    Completed,
}

/// Rule currently in flight.
struct Active<C> {
    rule: Box<dyn Rule<C>>,
    state: RuleState,
}

/// Ordered list of deferred rules, processed strictly one at a time.
///
/// # Semantics
///
/// - `enqueue` appends to the tail; nothing ever reorders ahead of an
///   earlier rule
/// - Rules that complete on start chain within one tick
/// - A `Waiting` rule halts the queue until its `update` reports `Complete`
///
/// This is analogous to a behavior-tree sequence node that can pause
/// between children across ticks.
pub struct RuleQueue<C> {
    pending: VecDeque<Box<dyn Rule<C>>>,
    active: Option<Active<C>>,
    completed: u64,
}

impl<C> RuleQueue<C> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            active: None,
            completed: 0,
        }
    }

    /// Appends a rule to the tail of the queue.
    pub fn enqueue(&mut self, rule: impl Rule<C> + 'static) {
        self.enqueue_boxed(Box::new(rule));
    }

    /// Appends an already boxed rule to the tail of the queue.
    pub fn enqueue_boxed(&mut self, rule: Box<dyn Rule<C>>) {
        trace!(target: "rule_queue", rule = rule.name(), queued = self.pending.len(), "enqueue");
        self.pending.push_back(rule);
    }

    /// Advances the queue by at most one rule.
    ///
    /// - With an active waiting rule: polls it with `dt`
    /// - Otherwise: pops the head and starts it
    ///
    /// Callers that need to react between rules (for example to flush events
    /// a rule produced) loop on `step` until it stops returning
    /// [`Step::Completed`]. Note that `dt` is only meaningful for the first
    /// call of a tick; later calls in the same tick only start new rules.
    pub fn step(&mut self, ctx: &mut C, dt: f32) -> Step {
        if let Some(active) = self.active.as_mut() {
            active.state = active.rule.update(ctx, dt).settled();
            if active.state.is_waiting() {
                return Step::Waiting;
            }
            debug!(target: "rule_queue", rule = active.rule.name(), "rule completed after waiting");
            self.active = None;
            self.completed += 1;
            return Step::Completed;
        }

        let Some(mut rule) = self.pending.pop_front() else {
            return Step::Idle;
        };

        let state = rule.start(ctx).settled();
        if state.is_complete() {
            debug!(target: "rule_queue", rule = rule.name(), "rule completed on start");
            self.completed += 1;
            return Step::Completed;
        }

        debug!(target: "rule_queue", rule = rule.name(), "rule waiting");
        self.active = Some(Active { rule, state });
        Step::Waiting
    }

    /// Drives the queue for one tick.
    ///
    /// Polls the active rule (if any), then keeps starting rules until one
    /// waits or the queue drains. Returns the number of rules completed.
    pub fn tick(&mut self, ctx: &mut C, dt: f32) -> usize {
        let mut completed = 0;
        let mut dt = dt;
        while self.step(ctx, dt) == Step::Completed {
            completed += 1;
            dt = 0.0;
        }
        completed
    }

    /// Discards every queued and active rule.
    ///
    /// Cancelled rules are dropped without further callbacks. Any event
    /// subscriptions a cancelled rule created must be released by its owner.
    /// Returns the number of rules discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.len();
        if discarded > 0 {
            debug!(target: "rule_queue", discarded, "queue cleared");
        }
        self.pending.clear();
        self.active = None;
        discarded
    }

    /// Number of rules not yet completed, including the active one.
    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.active.is_some())
    }

    /// Returns true if there is nothing queued or in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if a rule is currently waiting.
    pub fn is_waiting(&self) -> bool {
        self.active.is_some()
    }

    /// Name of the rule currently in flight.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.rule.name())
    }

    /// Names of the rules still queued behind the active one, head first.
    pub fn pending_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.pending.iter().map(|rule| rule.name())
    }

    /// Total number of rules completed since creation.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

impl<C> Default for RuleQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}
