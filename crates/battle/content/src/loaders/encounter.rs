//! Encounter loader: attack catalog plus combatant roster.
//!
//! RON format:
//! ```ron
//! (
//!     attacks: [
//!         (id: 1, name: "Claw", damage: 6, condition: MetOnHit, on_hit: Some("corrode")),
//!     ],
//!     combatants: [
//!         (id: 0, name: "Hero", side: Player, hp: 40),
//!         (
//!             id: 1, name: "Wolf", side: Enemy, hp: 20,
//!             passives: [(Stealth, 1)],
//!             repertoire: Some((turns: [[1], [1, 1]], mode: Cycle)),
//!         ),
//!     ],
//! )
//! ```

use std::path::Path;

use battle_core::{
    AttackCatalog, AttackDefinition, AttackHooks, AttackId, CatalogError, Combatant,
    ConditionKind, EntityId, HookLibrary, PassiveKind, Repertoire, Roster, SelectionMode, Side,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One attack definition as written in an encounter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackSpec {
    pub id: u32,
    pub name: String,
    pub damage: u32,
    #[serde(default)]
    pub bonus_if_unblocked: u32,
    #[serde(default)]
    pub condition: ConditionKind,
    #[serde(default)]
    pub telegraph: Option<String>,
    #[serde(default)]
    pub on_reveal: Option<String>,
    #[serde(default)]
    pub on_hit: Option<String>,
    #[serde(default)]
    pub special: Option<String>,
}

impl AttackSpec {
    /// Builds the definition, resolving hook names against `hooks`.
    pub fn build(&self, hooks: &HookLibrary) -> LoadResult<AttackDefinition> {
        let resolve = |e: CatalogError| anyhow::anyhow!("Attack '{}': {}", self.name, e);
        let attack_hooks = AttackHooks {
            on_reveal: self
                .on_reveal
                .as_deref()
                .map(|name| hooks.effect(name))
                .transpose()
                .map_err(resolve)?,
            on_hit: self
                .on_hit
                .as_deref()
                .map(|name| hooks.effect(name))
                .transpose()
                .map_err(resolve)?,
            special: self
                .special
                .as_deref()
                .map(|name| hooks.special(name))
                .transpose()
                .map_err(resolve)?,
        };

        let mut definition = AttackDefinition::new(AttackId(self.id), self.name.clone(), self.damage)
            .with_bonus_if_unblocked(self.bonus_if_unblocked)
            .with_condition(self.condition)
            .with_hooks(attack_hooks);
        if let Some(telegraph) = &self.telegraph {
            definition = definition.with_telegraph(telegraph.clone());
        }
        Ok(definition)
    }
}

/// Repertoire as written in an encounter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepertoireSpec {
    pub turns: Vec<Vec<u32>>,
    #[serde(default)]
    pub mode: SelectionMode,
}

/// One combatant as written in an encounter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub id: u32,
    pub name: String,
    pub side: Side,
    pub hp: u32,
    #[serde(default)]
    pub passives: Vec<(PassiveKind, u32)>,
    #[serde(default)]
    pub repertoire: Option<RepertoireSpec>,
}

impl CombatantSpec {
    pub fn build(&self) -> Combatant {
        let mut combatant = Combatant::new(EntityId(self.id), self.name.clone(), self.side, self.hp);
        for &(kind, amount) in &self.passives {
            combatant.passives.apply(kind, amount);
        }
        if let Some(spec) = &self.repertoire {
            let turns = spec
                .turns
                .iter()
                .map(|turn| turn.iter().copied().map(AttackId).collect())
                .collect();
            combatant.repertoire = Some(Repertoire::new(turns, spec.mode));
        }
        combatant
    }
}

/// Encounter file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterSpec {
    pub attacks: Vec<AttackSpec>,
    pub combatants: Vec<CombatantSpec>,
}

/// Assembled encounter, ready to start a battle with.
#[derive(Debug, Clone)]
pub struct Encounter {
    pub catalog: AttackCatalog,
    pub roster: Roster,
}

impl EncounterSpec {
    /// Builds the catalog and roster, checking every cross reference.
    pub fn build(&self, hooks: &HookLibrary) -> LoadResult<Encounter> {
        let mut catalog = AttackCatalog::new();
        for attack in &self.attacks {
            catalog
                .register(attack.build(hooks)?)
                .map_err(|e| anyhow::anyhow!("Failed to register attack: {}", e))?;
        }

        let roster = Roster::new(self.combatants.iter().map(CombatantSpec::build).collect())
            .map_err(|e| anyhow::anyhow!("Invalid roster: {}", e))?;
        roster
            .validate_against(&catalog)
            .map_err(|e| anyhow::anyhow!("Invalid repertoire: {}", e))?;

        tracing::debug!(
            target: "battle_content",
            attacks = catalog.len(),
            combatants = roster.len(),
            "encounter built"
        );
        Ok(Encounter { catalog, roster })
    }
}

/// Loader for encounters from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    /// Load and build an encounter from a RON file.
    pub fn load(path: &Path, hooks: &HookLibrary) -> LoadResult<Encounter> {
        let content = read_file(path)?;
        Self::parse(&content, hooks)
            .map_err(|e| anyhow::anyhow!("Encounter {}: {}", path.display(), e))
    }

    /// Parse and build an encounter from a RON string.
    pub fn parse(content: &str, hooks: &HookLibrary) -> LoadResult<Encounter> {
        let spec: EncounterSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))?;
        spec.build(hooks)
    }
}
