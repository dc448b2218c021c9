//! Battle simulation binary.
//!
//! Loads `config.toml` and an encounter from a data directory, plays the
//! battle with a scripted player and a fixed-delay presentation stub, and
//! prints the event journal.
//!
//! # Examples
//!
//! ```bash
//! # Default encounter, text journal
//! cargo run -p battle-sim
//!
//! # Another encounter as JSON, with engine debug logs
//! RUST_LOG=runtime=debug BATTLE_ENCOUNTER=crypt BATTLE_JSON=1 cargo run -p battle-sim
//! ```
mod config;
mod report;
mod script;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_runtime::Battle;

use config::SimConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        encounter = %config.encounter,
        turns = config.turns,
        "starting simulation"
    );

    let factory = ContentFactory::new(&config.data_dir);
    let mut battle_config = factory.load_config().context("loading battle config")?;
    if let Some(seed) = config.seed {
        battle_config.seed = seed;
    }
    let encounter = factory
        .load_encounter(&config.encounter)
        .with_context(|| format!("loading encounter '{}'", config.encounter))?;

    let mut battle = Battle::builder()
        .config(battle_config)
        .catalog(encounter.catalog)
        .roster(encounter.roster)
        .build()?;

    let verdict = script::run(&mut battle, &config);
    report::print(&battle, verdict, config.json)
}
