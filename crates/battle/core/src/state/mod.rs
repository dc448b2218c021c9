//! Battle state: combatants, phase, planned attacks and their progress.
//!
//! [`BattleState`] owns every piece of mutable battle data and exposes the
//! mutations the runtime performs in response to events. Each mutation that
//! changes an input of a progress record recomputes that record before
//! returning, and reports which derived fields changed.
//!
//! Missing references (unknown context, combatant or passive) are treated as
//! empty: the operation does nothing and returns `None` or an empty list.

mod combatant;
mod ids;

pub use combatant::{Combatant, Roster, Side};
pub use ids::{ContextId, EntityId};

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::debug;

use crate::attack::{AttackCatalog, AttackId};
use crate::config::BattleConfig;
use crate::error::CatalogError;
use crate::intent::{IntentPlanner, PlannedAttack, PlannedNotice};
use crate::passive::PassiveKind;
use crate::phase::PhaseMachine;
use crate::progress::{AttackProgress, CardColor, ProgressFields, ProgressRegistry};
use crate::rng::PcgRng;

/// Modifier reason used for corrosion block penalties.
pub const CORROSION_REASON: &str = "corrosion";

/// Block modification for `stacks` of corrosion, saturating at `i32::MIN`.
fn corrosion_penalty(stacks: u32) -> i32 {
    i32::try_from(stacks).map_or(i32::MIN, |stacks| -stacks)
}

/// All mutable data of one battle.
#[derive(Clone, Debug)]
pub struct BattleState {
    pub config: BattleConfig,
    pub phase: PhaseMachine,
    pub roster: Roster,
    pub progress: ProgressRegistry,
    pub planner: IntentPlanner,
    pub catalog: AttackCatalog,
    /// Hit-tracking counters per attack id.
    pub hits: HashMap<AttackId, u32>,
}

impl BattleState {
    /// Assembles a battle. Every repertoire must reference known attacks.
    pub fn new(
        config: BattleConfig,
        catalog: AttackCatalog,
        roster: Roster,
    ) -> Result<Self, CatalogError> {
        roster.validate_against(&catalog)?;
        Ok(Self {
            config,
            phase: PhaseMachine::new(),
            roster,
            progress: ProgressRegistry::new(),
            planner: IntentPlanner::new(),
            catalog,
            hits: HashMap::new(),
        })
    }

    /// Clears progress, planned intents, hit counters and phase/turn state.
    pub fn reset_for_battle(&mut self) {
        self.phase.reset();
        self.planner.reset();
        self.roster.clear_intents();
        self.progress.clear();
        self.hits.clear();
    }

    /// Plans `turn` with the battle's deterministic RNG.
    pub fn plan_turn(&mut self, turn: u32) -> Vec<PlannedNotice> {
        self.planner
            .plan_turn(turn, &mut self.roster, &self.catalog, &self.config, &PcgRng)
    }

    pub fn planned(&self, context: ContextId) -> Option<&PlannedAttack> {
        self.roster.planned(context)
    }

    pub fn progress(&self, context: ContextId) -> Option<&AttackProgress> {
        self.progress.get(context)
    }

    /// Recomputes the progress record of `context`.
    pub fn recompute(&mut self, context: ContextId) -> Option<ProgressFields> {
        let planned = self.roster.planned(context)?;
        let record = self.progress.get_mut(context)?;
        Some(record.recompute(&planned.definition, &planned.damage_modifiers))
    }

    /// Returns the progress record of `context`, creating and computing it
    /// on first use. `None` when no planned attack matches.
    pub fn progress_or_create(&mut self, context: ContextId) -> Option<&mut AttackProgress> {
        let planned = self.roster.planned(context)?;
        if !self.progress.contains(context) {
            let attacker = self.roster.owner(context)?;
            let defender = planned.target;
            let passives = self.roster.get(defender).map(|c| &c.passives);
            let aegis = passives.map_or(0, |p| p.amount(PassiveKind::Aegis));
            let corrosion = passives.map_or(0, |p| p.amount(PassiveKind::Corrosion));

            let record = self.progress.create(context, attacker, defender, aegis);
            if corrosion > 0 {
                record
                    .block_modifiers
                    .add(corrosion_penalty(corrosion), Cow::Borrowed(CORROSION_REASON));
            }
            record.recompute(&planned.definition, &planned.damage_modifiers);
        }
        self.progress.get_mut(context)
    }

    /// Records a card of `color` assigning `delta` block to `context`.
    pub fn assign_block(
        &mut self,
        context: ContextId,
        color: CardColor,
        delta: u32,
    ) -> Option<ProgressFields> {
        self.progress_or_create(context)?
            .on_block_assigned(color, delta);
        self.recompute(context)
    }

    /// Withdraws a card of `color` and `delta` block from `context`.
    pub fn remove_block(
        &mut self,
        context: ContextId,
        color: CardColor,
        delta: u32,
    ) -> Option<ProgressFields> {
        self.progress_or_create(context)?
            .on_block_removed(color, delta);
        self.recompute(context)
    }

    pub fn modify_block(
        &mut self,
        context: ContextId,
        delta: i32,
        reason: impl Into<Cow<'static, str>>,
    ) -> Option<ProgressFields> {
        self.progress_or_create(context)?
            .block_modifiers
            .add(delta, reason);
        self.recompute(context)
    }

    pub fn remove_block_modifier(
        &mut self,
        context: ContextId,
        reason: &str,
    ) -> Option<ProgressFields> {
        self.progress.get_mut(context)?.block_modifiers.remove_reason(reason);
        self.recompute(context)
    }

    /// Adds a damage modification to the planned attack of `context`.
    ///
    /// Returns the changed progress fields, or an empty set when no progress
    /// record exists yet.
    pub fn modify_damage(
        &mut self,
        context: ContextId,
        delta: i32,
        reason: impl Into<Cow<'static, str>>,
    ) -> Option<ProgressFields> {
        self.roster
            .planned_mut(context)?
            .damage_modifiers
            .add(delta, reason);
        Some(self.recompute(context).unwrap_or_default())
    }

    pub fn remove_damage_modifier(
        &mut self,
        context: ContextId,
        reason: &str,
    ) -> Option<ProgressFields> {
        self.roster
            .planned_mut(context)?
            .damage_modifiers
            .remove_reason(reason);
        Some(self.recompute(context).unwrap_or_default())
    }

    /// Shifts the prevention snapshot of every record defended by `defender`
    /// and recomputes them.
    pub fn adjust_aegis(
        &mut self,
        defender: EntityId,
        delta: i32,
    ) -> Vec<(ContextId, ProgressFields)> {
        let touched = self.progress.adjust_aegis(defender, delta);
        self.recompute_all(touched)
    }

    /// Zeroes the prevention snapshot of every record defended by `defender`.
    pub fn reset_aegis(&mut self, defender: EntityId) -> Vec<(ContextId, ProgressFields)> {
        let touched = self.progress.reset_aegis(defender);
        self.recompute_all(touched)
    }

    /// Replaces the corrosion block penalty on every record defended by
    /// `defender` with `-stacks`.
    pub fn set_corrosion(
        &mut self,
        defender: EntityId,
        stacks: u32,
    ) -> Vec<(ContextId, ProgressFields)> {
        let touched = self.progress.contexts_defended_by(defender);
        for context in &touched {
            if let Some(record) = self.progress.get_mut(*context) {
                record.block_modifiers.remove_reason(CORROSION_REASON);
                if stacks > 0 {
                    record
                        .block_modifiers
                        .add(corrosion_penalty(stacks), Cow::Borrowed(CORROSION_REASON));
                }
            }
        }
        self.recompute_all(touched)
    }

    fn recompute_all(&mut self, contexts: Vec<ContextId>) -> Vec<(ContextId, ProgressFields)> {
        contexts
            .into_iter()
            .filter_map(|context| self.recompute(context).map(|fields| (context, fields)))
            .collect()
    }

    /// Removes the planned attack of `context` together with its progress.
    pub fn retire(&mut self, context: ContextId) -> Option<PlannedAttack> {
        let removed = self.roster.remove_planned(context);
        self.progress.destroy(context);
        if removed.is_some() {
            debug!(target: "battle_core::state", %context, "planned attack retired");
        }
        removed
    }

    /// Drops every planned attack and progress record of `entity`. Returns
    /// the contexts dropped.
    pub fn drop_plans_of(&mut self, entity: EntityId) -> Vec<ContextId> {
        let mut dropped = self.roster.drop_intents_of(entity);
        dropped.extend(self.progress.contexts_attacked_by(entity));
        dropped.sort();
        dropped.dedup();
        for context in &dropped {
            self.progress.destroy(*context);
        }
        dropped
    }

    /// Increments the hit counter of `attack`. Returns the new count.
    pub fn record_hit(&mut self, attack: AttackId) -> u32 {
        let hits = self.hits.entry(attack).or_insert(0);
        *hits += 1;
        *hits
    }
}
