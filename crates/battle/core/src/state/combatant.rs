use std::collections::HashMap;

use crate::attack::AttackCatalog;
use crate::error::{CatalogError, RosterError};
use crate::intent::{AttackIntent, PlannedAttack, Repertoire};
use crate::passive::PassiveLedger;

use super::{ContextId, EntityId};

/// Which side of the battle a combatant fights on.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Side {
    Player,
    Enemy,
}

/// One participant in a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combatant {
    pub id: EntityId,
    pub name: String,
    pub side: Side,
    pub hp: u32,
    pub max_hp: u32,
    pub passives: PassiveLedger,
    /// Attacks planned for the current turn.
    pub intent: AttackIntent,
    /// Preview of next turn's attacks.
    pub next_intent: AttackIntent,
    pub repertoire: Option<Repertoire>,
}

impl Combatant {
    pub fn new(id: EntityId, name: impl Into<String>, side: Side, max_hp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            hp: max_hp,
            max_hp,
            passives: PassiveLedger::new(),
            intent: AttackIntent::new(),
            next_intent: AttackIntent::new(),
            repertoire: None,
        }
    }

    pub fn with_repertoire(mut self, repertoire: Repertoire) -> Self {
        self.repertoire = Some(repertoire);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Subtracts `damage` from HP, clamped at zero. Returns the HP lost.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let before = self.hp;
        self.hp = crate::combat::apply_damage(self.hp, damage);
        before - self.hp
    }

    /// Restores up to `amount` HP, capped at max. Returns the HP gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }
}

/// Every combatant of a battle, in roster order.
///
/// Roster order decides which attacker resolves first. The roster also
/// indexes which combatant owns each planned context.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    combatants: Vec<Combatant>,
    owners: HashMap<ContextId, EntityId>,
}

impl Roster {
    /// Builds a roster with unique ids and exactly one player.
    pub fn new(combatants: Vec<Combatant>) -> Result<Self, RosterError> {
        for (index, combatant) in combatants.iter().enumerate() {
            if combatants[..index].iter().any(|other| other.id == combatant.id) {
                return Err(RosterError::DuplicateCombatant(combatant.id));
            }
        }
        match combatants.iter().filter(|c| c.side == Side::Player).count() {
            0 => return Err(RosterError::MissingPlayer),
            1 => {}
            _ => return Err(RosterError::MultiplePlayers),
        }
        Ok(Self {
            combatants,
            owners: HashMap::new(),
        })
    }

    /// Checks that every repertoire only names attacks in `catalog`.
    pub fn validate_against(&self, catalog: &AttackCatalog) -> Result<(), CatalogError> {
        for combatant in &self.combatants {
            let Some(repertoire) = &combatant.repertoire else {
                continue;
            };
            if let Some(attack) = repertoire.attack_ids().find(|id| !catalog.contains(*id)) {
                return Err(CatalogError::UnknownAttack {
                    attack,
                    referenced_by: combatant.id,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.combatants
            .iter()
            .find(|c| c.side == Side::Player)
            .map(|c| c.id)
    }

    /// Living combatants that have a repertoire, in roster order.
    pub fn attacker_ids(&self) -> Vec<EntityId> {
        self.combatants
            .iter()
            .filter(|c| c.is_alive() && c.repertoire.is_some())
            .map(|c| c.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn owner(&self, context: ContextId) -> Option<EntityId> {
        self.owners.get(&context).copied()
    }

    pub fn register_owner(&mut self, context: ContextId, owner: EntityId) {
        self.owners.insert(context, owner);
    }

    pub fn forget_owner(&mut self, context: ContextId) {
        self.owners.remove(&context);
    }

    /// Current-turn planned attack for `context`.
    pub fn planned(&self, context: ContextId) -> Option<&PlannedAttack> {
        let owner = self.owner(context)?;
        self.get(owner)?.intent.get(context)
    }

    pub fn planned_mut(&mut self, context: ContextId) -> Option<&mut PlannedAttack> {
        let owner = self.owner(context)?;
        self.get_mut(owner)?.intent.get_mut(context)
    }

    /// Removes the current-turn planned attack for `context`.
    pub fn remove_planned(&mut self, context: ContextId) -> Option<PlannedAttack> {
        let owner = self.owner(context)?;
        let removed = self.get_mut(owner)?.intent.remove(context);
        if removed.is_some() {
            self.owners.remove(&context);
        }
        removed
    }

    /// Next attack to resolve: roster order first, then resolve step.
    pub fn next_planned(&self) -> Option<(EntityId, ContextId)> {
        self.combatants
            .iter()
            .filter(|c| c.is_alive())
            .find_map(|c| c.intent.first().map(|planned| (c.id, planned.context)))
    }

    pub fn has_planned(&self) -> bool {
        self.next_planned().is_some()
    }

    /// Drops current and preview intents of `entity`. Returns the contexts
    /// that were dropped.
    pub fn drop_intents_of(&mut self, entity: EntityId) -> Vec<ContextId> {
        let Some(combatant) = self.get_mut(entity) else {
            return Vec::new();
        };
        let mut dropped: Vec<_> = combatant.intent.take().contexts().collect();
        dropped.extend(combatant.next_intent.take().contexts());
        for context in &dropped {
            self.owners.remove(context);
        }
        dropped
    }

    /// Drops every planned attack of every combatant.
    pub fn clear_intents(&mut self) {
        for combatant in &mut self.combatants {
            combatant.intent.clear();
            combatant.next_intent.clear();
        }
        self.owners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{AttackDefinition, AttackId};
    use crate::intent::SelectionMode;

    fn hero() -> Combatant {
        Combatant::new(EntityId::PLAYER, "hero", Side::Player, 30)
    }

    #[test]
    fn roster_requires_exactly_one_player() {
        let enemy = Combatant::new(EntityId(1), "rat", Side::Enemy, 5);
        assert_eq!(
            Roster::new(vec![enemy.clone()]).unwrap_err(),
            RosterError::MissingPlayer
        );
        let mut second = hero();
        second.id = EntityId(9);
        assert_eq!(
            Roster::new(vec![hero(), second]).unwrap_err(),
            RosterError::MultiplePlayers
        );
        assert_eq!(
            Roster::new(vec![hero(), enemy.clone(), enemy]).unwrap_err(),
            RosterError::DuplicateCombatant(EntityId(1))
        );
    }

    #[test]
    fn repertoires_must_reference_known_attacks() {
        let mut catalog = AttackCatalog::new();
        catalog
            .register(AttackDefinition::new(AttackId(1), "slash", 4))
            .unwrap();
        let enemy = Combatant::new(EntityId(1), "rat", Side::Enemy, 5).with_repertoire(
            Repertoire::new(vec![vec![AttackId(1), AttackId(2)]], SelectionMode::Cycle),
        );
        let roster = Roster::new(vec![hero(), enemy]).unwrap();
        assert_eq!(
            roster.validate_against(&catalog).unwrap_err(),
            CatalogError::UnknownAttack {
                attack: AttackId(2),
                referenced_by: EntityId(1)
            }
        );
    }

    #[test]
    fn damage_and_heal_clamp() {
        let mut hero = hero();
        assert_eq!(hero.take_damage(50), 30);
        assert!(!hero.is_alive());
        assert_eq!(hero.heal(100), 30);
        assert_eq!(hero.hp, 30);
    }
}
