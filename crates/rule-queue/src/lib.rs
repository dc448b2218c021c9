//! Cooperative, tick-driven rule sequencer for turn-based games.
//!
//! A [`RuleQueue`] holds small executable steps ("rules") and runs them in
//! strict FIFO order. A rule either finishes the moment it starts or reports
//! [`RuleState::Waiting`] and is polled every tick until an externally
//! satisfied condition holds.
//!
//! - **No threads, no async**: suspension is an explicit state, not a blocked call
//! - **One rule in flight**: rule *N+1* never starts while rule *N* is waiting
//! - **Trivially cancellable**: [`RuleQueue::clear`] drops everything at once
//!
//! # Architecture
//!
//! - [`Rule`]: Core trait for all queued steps
//! - [`RuleState`]: Pending, Waiting or Complete
//! - [`RuleQueue`]: The FIFO driver
//! - Ready-made rules: [`Instant`], [`WaitUntil`]
//! - Decorators: [`Timeout`]

pub mod builder;
pub mod decorator;
pub mod queue;
pub mod rule;
pub mod state;

pub use builder::{Instant, WaitUntil};
pub use decorator::Timeout;
pub use queue::{RuleQueue, Step};
pub use rule::Rule;
pub use state::RuleState;
