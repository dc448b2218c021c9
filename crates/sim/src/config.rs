//! Simulation settings read from the environment.
use std::env;
use std::path::PathBuf;

/// Knobs for one simulated battle.
///
/// Battle rules come from `config.toml` in the data directory; these only
/// steer the scripted player, the presentation stub and the output.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub data_dir: PathBuf,
    pub encounter: String,
    /// Number of full rounds to play before stopping.
    pub turns: u32,
    /// Overrides the seed from `config.toml`.
    pub seed: Option<u64>,
    /// Print the journal as JSON instead of text.
    pub json: bool,
    /// Seconds per simulated frame.
    pub frame: f32,
    /// Seconds the presentation stub animates an attack before impact.
    pub impact_delay: f32,
    pub player: PlayerScript,
}

/// What the scripted player does each turn.
#[derive(Clone, Debug)]
pub struct PlayerScript {
    /// Damage dealt to the first living enemy during Action.
    pub strike: u32,
    /// Cards played against each revealed attack.
    pub cards_per_attack: u32,
    pub block_per_card: u32,
}

impl Default for PlayerScript {
    fn default() -> Self {
        Self {
            strike: 5,
            cards_per_attack: 2,
            block_per_card: 2,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            encounter: String::from("wolf_den"),
            turns: 3,
            seed: None,
            json: false,
            frame: 0.05,
            impact_delay: 0.3,
            player: PlayerScript::default(),
        }
    }
}

impl SimConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_DATA_DIR` - Directory holding `config.toml` and `encounters/`
    /// - `BATTLE_ENCOUNTER` - Encounter file name without extension (default: wolf_den)
    /// - `BATTLE_TURNS` - Rounds to simulate (default: 3)
    /// - `BATTLE_SEED` - Seed override
    /// - `BATTLE_JSON` - Emit the journal as JSON (default: false)
    /// - `BATTLE_FRAME` - Seconds per frame (default: 0.05)
    /// - `BATTLE_IMPACT_DELAY` - Seconds before impact (default: 0.3)
    /// - `BATTLE_PLAYER_STRIKE`, `BATTLE_PLAYER_CARDS`, `BATTLE_PLAYER_BLOCK`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("BATTLE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(name) = env::var("BATTLE_ENCOUNTER") {
            config.encounter = name;
        }
        if let Some(turns) = read_env::<u32>("BATTLE_TURNS") {
            config.turns = turns.max(1);
        }
        config.seed = read_env::<u64>("BATTLE_SEED");
        if let Some(json) = read_env::<bool>("BATTLE_JSON") {
            config.json = json;
        } else if env::var("BATTLE_JSON").is_ok() {
            config.json = true;
        }
        if let Some(frame) = read_env::<f32>("BATTLE_FRAME").filter(|f| *f > 0.0) {
            config.frame = frame;
        }
        if let Some(delay) = read_env::<f32>("BATTLE_IMPACT_DELAY").filter(|d| *d >= 0.0) {
            config.impact_delay = delay;
        }
        if let Some(strike) = read_env::<u32>("BATTLE_PLAYER_STRIKE") {
            config.player.strike = strike;
        }
        if let Some(cards) = read_env::<u32>("BATTLE_PLAYER_CARDS") {
            config.player.cards_per_attack = cards;
        }
        if let Some(block) = read_env::<u32>("BATTLE_PLAYER_BLOCK") {
            config.player.block_per_card = block;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
