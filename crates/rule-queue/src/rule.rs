//! Core rule trait.
//!
//! This module defines the [`Rule`] trait, the unit of work driven by a
//! [`RuleQueue`](crate::RuleQueue). The trait is generic over a context type
//! `C`, giving rules mutable access to whatever state they sequence.

use crate::RuleState;

/// A single step in the deferred sequencer.
pub trait Rule<C> {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Runs the rule once when it reaches the head of the queue.
    ///
    /// # Returns
    ///
    /// - `RuleState::Complete` if the work finished synchronously
    /// - `RuleState::Waiting` if the rule must be polled on later ticks
    fn start(&mut self, ctx: &mut C) -> RuleState;

    /// Polls a waiting rule. Called once per tick, only while the rule is
    /// `Waiting`.
    ///
    /// The default implementation completes immediately, which suits rules
    /// that never wait.
    fn update(&mut self, _ctx: &mut C, _dt: f32) -> RuleState {
        RuleState::Complete
    }
}

/// Blanket implementation for boxed rules.
///
/// This allows `Box<dyn Rule<C>>` to also implement `Rule<C>`, so decorators
/// can wrap heterogeneous rules.
impl<C> Rule<C> for Box<dyn Rule<C>> {
    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline]
    fn start(&mut self, ctx: &mut C) -> RuleState {
        (**self).start(ctx)
    }

    #[inline]
    fn update(&mut self, ctx: &mut C, dt: f32) -> RuleState {
        (**self).update(ctx, dt)
    }
}
