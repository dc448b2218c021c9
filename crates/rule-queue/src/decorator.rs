//! Decorator rules.
//!
//! Decorators wrap a single rule and modify how it waits. This module provides
//! [`Timeout`], a guard against a signal that never arrives.

use tracing::warn;

use crate::{Rule, RuleState};

/// Bounds how long the wrapped rule may stay `Waiting`.
///
/// # Semantics
///
/// - Elapsed time accumulates from the `dt` passed to each `update`
/// - If the child completes first, the timeout is a no-op
/// - Once the limit is reached, `on_expire` runs and the rule completes
///
/// The fallback usually produces the signal the child was waiting for, so a
/// stuck wait degrades into a late one rather than a frozen turn.
pub struct Timeout<C> {
    child: Box<dyn Rule<C>>,
    limit: f32,
    elapsed: f32,
    on_expire: Option<Box<dyn FnOnce(&mut C)>>,
}

impl<C> Timeout<C> {
    /// Wraps `child`, allowing it to wait for at most `limit` seconds.
    pub fn new(
        child: Box<dyn Rule<C>>,
        limit: f32,
        on_expire: impl FnOnce(&mut C) + 'static,
    ) -> Self {
        Self {
            child,
            limit,
            elapsed: 0.0,
            on_expire: Some(Box::new(on_expire)),
        }
    }
}

impl<C> Rule<C> for Timeout<C> {
    fn name(&self) -> &str {
        self.child.name()
    }

    fn start(&mut self, ctx: &mut C) -> RuleState {
        self.child.start(ctx)
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> RuleState {
        let state = self.child.update(ctx, dt).settled();
        if state.is_complete() {
            return state;
        }

        self.elapsed += dt;
        if self.elapsed < self.limit {
            return RuleState::Waiting;
        }

        warn!(
            target: "rule_queue",
            rule = self.child.name(),
            elapsed = self.elapsed,
            limit = self.limit,
            "wait timed out, running fallback"
        );
        if let Some(on_expire) = self.on_expire.take() {
            on_expire(ctx);
        }
        RuleState::Complete
    }
}
