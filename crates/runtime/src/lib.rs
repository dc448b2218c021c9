//! Event-driven runtime for battle resolution.
//!
//! This crate sequences the pure rules of `battle-core` against the outside
//! world. Presentation and input talk to a [`Battle`] exclusively through
//! [`BattleEvent`]s; the engine answers with outbound events and defers
//! anything that must wait for presentation onto a rule queue.
//!
//! Modules are organized by responsibility:
//! - [`battle`] hosts the tick-driven driver and its builder
//! - [`events`] defines the event enum, the bus and the journal
//! - [`handlers`] holds the default reactions to inbound events
//! - [`pipeline`] drives each attack from resolution through impact
//! - [`rules`] provides the queued steps of the enemy turn
pub mod battle;
pub mod context;
pub mod error;
pub mod events;
pub mod handlers;
pub mod pipeline;
pub mod rules;

pub use battle::{Battle, BattleBuilder};
pub use context::{BattleContext, BattleQueue, HandlerContext};
pub use error::{BattleError, Result};
pub use events::{
    BattleEvent, BattleEventKind, EventBus, EventHandler, EventJournal, FnHandler, JournalEntry,
    SubscriptionId,
};
pub use handlers::install_default_handlers;
pub use pipeline::{Resolution, ResolutionStage, Resolutions};
pub use rules::{RequestPhase, await_impact, enqueue_enemy_flow};
