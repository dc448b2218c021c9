//! Errors surfaced while assembling a battle.
//!
//! Only setup can fail. Once a [`Battle`](crate::Battle) exists, every event
//! is fire-and-forget and unknown references are ignored.
use battle_core::{CatalogError, ConfigError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BattleError>;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("battle requires a roster before building")]
    MissingRoster,

    #[error("invalid battle config")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
