use crate::error::ConfigError;

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Base seed for every deterministic roll in the battle.
    pub seed: u64,

    /// Ambush chance (percent) before passive bonuses.
    pub ambush_base_chance: u32,

    /// Ambush chance (percent) added per Stealth stack on the attacker.
    pub ambush_chance_per_stealth: u32,

    /// Seconds an impact wait may stay pending before the engine signals
    /// impact itself. `None` waits for the presentation layer indefinitely.
    pub impact_timeout: Option<f32>,

    /// Number of dispatched events retained in the journal.
    pub journal_capacity: usize,

    /// Maximum depth of nested publishes before follow-ups are dropped.
    pub max_dispatch_depth: usize,

    /// Whether the engine enqueues enemy-turn phase transitions itself.
    pub auto_advance_enemy_turn: bool,
}

impl BattleConfig {
    // ===== compile-time constants =====
    pub const MAX_AMBUSH_CHANCE: u32 = 100;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_AMBUSH_CHANCE_PER_STEALTH: u32 = 10;
    pub const DEFAULT_JOURNAL_CAPACITY: usize = 1024;
    pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 32;

    pub fn new() -> Self {
        Self {
            seed: 0,
            ambush_base_chance: 0,
            ambush_chance_per_stealth: Self::DEFAULT_AMBUSH_CHANCE_PER_STEALTH,
            impact_timeout: None,
            journal_capacity: Self::DEFAULT_JOURNAL_CAPACITY,
            max_dispatch_depth: Self::DEFAULT_MAX_DISPATCH_DEPTH,
            auto_advance_enemy_turn: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_impact_timeout(mut self, seconds: f32) -> Self {
        self.impact_timeout = Some(seconds);
        self
    }

    pub fn with_ambush(mut self, base_chance: u32, per_stealth: u32) -> Self {
        self.ambush_base_chance = base_chance;
        self.ambush_chance_per_stealth = per_stealth;
        self
    }

    /// Ambush chance for an attacker carrying `stealth` stacks, capped at 100.
    pub fn ambush_chance(&self, stealth: u32) -> u32 {
        self.ambush_base_chance
            .saturating_add(self.ambush_chance_per_stealth.saturating_mul(stealth))
            .min(Self::MAX_AMBUSH_CHANCE)
    }

    /// Checks that every field is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ambush_base_chance > Self::MAX_AMBUSH_CHANCE {
            return Err(ConfigError::AmbushChanceOutOfRange(self.ambush_base_chance));
        }
        if self.journal_capacity == 0 {
            return Err(ConfigError::ZeroJournalCapacity);
        }
        if self.max_dispatch_depth == 0 {
            return Err(ConfigError::ZeroDispatchDepth);
        }
        if let Some(timeout) = self.impact_timeout
            && (timeout.is_nan() || timeout <= 0.0)
        {
            return Err(ConfigError::NonPositiveTimeout(timeout));
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
