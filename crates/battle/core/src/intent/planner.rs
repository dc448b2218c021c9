use tracing::{debug, info, warn};

use super::{AttackIntent, PlannedAttack, Repertoire};
use crate::attack::{AttackCatalog, AttackId};
use crate::config::BattleConfig;
use crate::modifier::ModifierLedger;
use crate::passive::PassiveKind;
use crate::rng::{RngOracle, compute_seed};
use crate::state::{ContextId, EntityId, Roster};

const SALT_SELECT: u64 = 0x5e1e_c700;
const SALT_CONTEXT: u64 = 0xc0_7e47;
const SALT_AMBUSH: u64 = 0xa4b_0500;

/// Notification that an attack was planned, for telegraph consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedNotice {
    pub attacker: EntityId,
    pub attack: AttackId,
    pub context: ContextId,
    pub step: u32,
    pub turn: u32,
    pub telegraph: String,
    /// True for next-turn previews.
    pub preview: bool,
    pub is_ambush: bool,
}

/// Turns repertoires into planned attacks at the start of each enemy turn.
///
/// Planning is idempotent per turn number: a repeated request for a turn
/// that was already planned produces nothing. [`IntentPlanner::reset`]
/// clears the guard at battle start.
///
/// Context ids combine a seeded 64-bit roll with a sequence number that is
/// never reset, so they cannot collide within a battle.
#[derive(Clone, Debug, Default)]
pub struct IntentPlanner {
    last_planned_turn: Option<u32>,
    next_sequence: u64,
}

/// Per-attacker inputs shared by every materialization in one planning pass.
struct Materialize<'a, R> {
    config: &'a BattleConfig,
    catalog: &'a AttackCatalog,
    rng: &'a R,
    attacker: EntityId,
    target: EntityId,
    stealth: u32,
}

impl IntentPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the "already planned" guard so turn 1 can be planned again.
    pub fn reset(&mut self) {
        self.last_planned_turn = None;
    }

    pub fn last_planned_turn(&self) -> Option<u32> {
        self.last_planned_turn
    }

    pub fn already_planned(&self, turn: u32) -> bool {
        self.last_planned_turn == Some(turn)
    }

    /// Plans `turn` for every living attacker with a repertoire.
    ///
    /// For each attacker:
    /// 1. An empty current intent takes over the next-turn preview
    /// 2. If still empty, the current turn is drawn from the repertoire
    /// 3. The next-turn preview is always drawn afresh
    ///
    /// Returns one notice per planned attack, current turn first.
    pub fn plan_turn(
        &mut self,
        turn: u32,
        roster: &mut Roster,
        catalog: &AttackCatalog,
        config: &BattleConfig,
        rng: &impl RngOracle,
    ) -> Vec<PlannedNotice> {
        if self.already_planned(turn) {
            debug!(target: "battle_core::planner", turn, "turn already planned");
            return Vec::new();
        }
        self.last_planned_turn = Some(turn);

        let target = roster.player_id().unwrap_or(EntityId::PLAYER);
        let mut notices = Vec::new();
        let mut stale = Vec::new();
        let mut owned = Vec::new();

        for id in roster.attacker_ids() {
            let Some(attacker) = roster.get_mut(id) else {
                continue;
            };
            let Some(repertoire) = attacker.repertoire.as_ref() else {
                continue;
            };
            let inputs = Materialize {
                config,
                catalog,
                rng,
                attacker: id,
                target,
                stealth: attacker.passives.amount(PassiveKind::Stealth),
            };

            if attacker.intent.is_empty() {
                attacker.intent = attacker.next_intent.take();
            }
            if attacker.intent.is_empty() {
                attacker.intent = self.materialize(&inputs, repertoire, turn);
            }
            stale.extend(attacker.next_intent.contexts());
            attacker.next_intent = self.materialize(&inputs, repertoire, turn + 1);

            for (intent, preview) in [(&attacker.intent, false), (&attacker.next_intent, true)] {
                for planned in intent.iter() {
                    owned.push((planned.context, id));
                    notices.push(PlannedNotice {
                        attacker: id,
                        attack: planned.attack_id,
                        context: planned.context,
                        step: planned.resolve_step,
                        turn: if preview { turn + 1 } else { turn },
                        telegraph: planned.telegraph(),
                        preview,
                        is_ambush: planned.is_ambush,
                    });
                }
            }
        }

        for context in stale {
            roster.forget_owner(context);
        }
        for (context, owner) in owned {
            roster.register_owner(context, owner);
        }

        notices.sort_by_key(|notice| notice.preview);
        info!(
            target: "battle_core::planner",
            turn,
            planned = notices.iter().filter(|n| !n.preview).count(),
            previewed = notices.iter().filter(|n| n.preview).count(),
            "turn planned"
        );
        notices
    }

    fn materialize<R: RngOracle>(
        &mut self,
        inputs: &Materialize<'_, R>,
        repertoire: &Repertoire,
        turn: u32,
    ) -> AttackIntent {
        let Materialize {
            config,
            catalog,
            rng,
            attacker,
            target,
            stealth,
        } = *inputs;
        let turn64 = u64::from(turn);
        let select_seed = compute_seed(config.seed, turn64, attacker.0, SALT_SELECT);
        let chance = config.ambush_chance(stealth);

        let mut intent = AttackIntent::new();
        for (index, &attack_id) in repertoire.select(turn, rng, select_seed).iter().enumerate() {
            let Some(definition) = catalog.get(attack_id) else {
                warn!(
                    target: "battle_core::planner",
                    %attacker,
                    attack = %attack_id,
                    "repertoire references unknown attack"
                );
                continue;
            };
            let step = index as u32 + 1;

            let sequence = self.next_sequence;
            self.next_sequence += 1;
            let context_seed =
                compute_seed(config.seed, turn64, attacker.0, SALT_CONTEXT ^ sequence);
            let context = ContextId::from_parts(rng.next_u64(context_seed), sequence);

            let ambush_seed =
                compute_seed(config.seed, turn64, attacker.0, SALT_AMBUSH + u64::from(step));
            let is_ambush = chance > 0 && rng.roll_d100(ambush_seed) <= chance;

            debug!(
                target: "battle_core::planner",
                %attacker,
                attack = %attack_id,
                %context,
                step,
                turn,
                is_ambush,
                "attack planned"
            );
            intent.push(PlannedAttack {
                attack_id,
                resolve_step: step,
                context,
                is_ambush,
                was_blocked: false,
                revealed: false,
                target,
                definition,
                damage_modifiers: ModifierLedger::new(),
            });
        }
        intent
    }
}
