//! Closure-backed rules for ergonomic queue construction.
//!
//! Instead of declaring a struct and a `Rule` impl for every one-off step,
//! use [`Instant`] for synchronous work and [`WaitUntil`] for polling a
//! condition.

use crate::{Rule, RuleState};

/// Runs a closure once and completes immediately.
pub struct Instant<C> {
    name: &'static str,
    action: Option<Box<dyn FnOnce(&mut C)>>,
}

impl<C> Instant<C> {
    /// Creates a rule that runs `action` when started.
    pub fn new(name: &'static str, action: impl FnOnce(&mut C) + 'static) -> Self {
        Self {
            name,
            action: Some(Box::new(action)),
        }
    }
}

impl<C> Rule<C> for Instant<C> {
    fn name(&self) -> &str {
        self.name
    }

    fn start(&mut self, ctx: &mut C) -> RuleState {
        if let Some(action) = self.action.take() {
            action(ctx);
        }
        RuleState::Complete
    }
}

/// Waits until a predicate over the context holds.
///
/// The predicate is checked on start as well, so a condition that is already
/// satisfied completes without costing a tick.
pub struct WaitUntil<C> {
    name: &'static str,
    predicate: Box<dyn FnMut(&C) -> bool>,
}

impl<C> WaitUntil<C> {
    /// Creates a rule that waits for `predicate` to return `true`.
    pub fn new(name: &'static str, predicate: impl FnMut(&C) -> bool + 'static) -> Self {
        Self {
            name,
            predicate: Box::new(predicate),
        }
    }

    fn poll(&mut self, ctx: &C) -> RuleState {
        if (self.predicate)(ctx) {
            RuleState::Complete
        } else {
            RuleState::Waiting
        }
    }
}

impl<C> Rule<C> for WaitUntil<C> {
    fn name(&self) -> &str {
        self.name
    }

    fn start(&mut self, ctx: &mut C) -> RuleState {
        self.poll(ctx)
    }

    fn update(&mut self, ctx: &mut C, _dt: f32) -> RuleState {
        self.poll(ctx)
    }
}
