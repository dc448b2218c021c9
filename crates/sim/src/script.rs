//! Scripted stand-ins for the player and the presentation layer.

use std::collections::{HashMap, HashSet};
use std::fmt;

use battle_core::{CardColor, ContextId, EntityId, MinorPhase, Side};
use battle_runtime::{Battle, BattleEvent};
use tracing::{debug, info, warn};

use crate::config::{PlayerScript, SimConfig};

const CARD_COLORS: [CardColor; 3] = [CardColor::Red, CardColor::Blue, CardColor::Green];

/// How a simulated battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Victory,
    Defeat,
    RoundsElapsed,
    /// The frame budget ran out with the battle still going.
    Stalled,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Victory => "victory",
            Verdict::Defeat => "defeat",
            Verdict::RoundsElapsed => "rounds elapsed",
            Verdict::Stalled => "stalled",
        };
        f.write_str(label)
    }
}

/// Plays attack animations: each awaiting impact lands after a fixed delay.
#[derive(Debug)]
pub struct Presentation {
    delay: f32,
    animating: HashMap<ContextId, f32>,
}

impl Presentation {
    pub fn new(delay: f32) -> Self {
        Self {
            delay,
            animating: HashMap::new(),
        }
    }

    pub fn update(&mut self, battle: &mut Battle, dt: f32) {
        let awaiting = battle.awaiting_impacts();
        self.animating.retain(|context, _| awaiting.contains(context));

        let mut landed = Vec::new();
        for context in awaiting {
            let elapsed = self.animating.entry(context).or_insert(0.0);
            *elapsed += dt;
            if *elapsed >= self.delay {
                landed.push(context);
            }
        }
        for context in landed {
            self.animating.remove(&context);
            debug!(target: "battle_sim", %context, "impact");
            battle.publish(BattleEvent::ImpactNow { context });
        }
    }
}

/// Deterministic player: strikes the first living enemy each turn and
/// spreads a fixed number of block cards over every revealed attack.
///
/// Enemy-turn phases are advanced only when the engine has nothing queued,
/// so the script also drives battles configured for manual sequencing.
#[derive(Debug)]
pub struct ScriptedPlayer {
    script: PlayerScript,
    rounds: u32,
    blocked: HashSet<ContextId>,
}

impl ScriptedPlayer {
    pub fn new(script: PlayerScript, rounds: u32) -> Self {
        Self {
            script,
            rounds,
            blocked: HashSet::new(),
        }
    }

    /// Takes the player's next step. Returns a verdict once the battle is
    /// over.
    pub fn act(&mut self, battle: &mut Battle) -> Option<Verdict> {
        if let Some(verdict) = verdict(battle) {
            return Some(verdict);
        }
        let idle = battle.queue().is_empty() && battle.awaiting_impacts().is_empty();
        if !idle {
            return None;
        }

        let phase = battle.phase();
        let next = match phase.minor {
            MinorPhase::StartBattle | MinorPhase::EnemyEnd => MinorPhase::PlayerStart,
            MinorPhase::PlayerStart => {
                if phase.turn >= self.rounds {
                    return Some(Verdict::RoundsElapsed);
                }
                MinorPhase::Action
            }
            MinorPhase::Pledge => MinorPhase::Action,
            MinorPhase::Action => {
                self.strike(battle);
                MinorPhase::PlayerEnd
            }
            MinorPhase::PlayerEnd => MinorPhase::EnemyStart,
            MinorPhase::EnemyStart | MinorPhase::EnemyAttack => {
                if battle.state().roster.has_planned() {
                    MinorPhase::PreBlock
                } else {
                    MinorPhase::EnemyEnd
                }
            }
            MinorPhase::PreBlock => MinorPhase::Block,
            MinorPhase::Block => {
                self.block(battle);
                MinorPhase::EnemyAttack
            }
        };
        battle.publish(BattleEvent::phase_request(next));
        None
    }

    fn strike(&self, battle: &mut Battle) {
        let target = battle
            .state()
            .roster
            .iter()
            .find(|c| c.side == Side::Enemy && c.is_alive())
            .map(|c| c.id);
        if let Some(target) = target {
            battle.publish(BattleEvent::DamageIntent {
                source: EntityId::PLAYER,
                target,
                amount: self.script.strike,
                attack: None,
                context: None,
            });
        }
    }

    fn block(&mut self, battle: &mut Battle) {
        let Some((_, context)) = battle.state().roster.next_planned() else {
            return;
        };
        if !self.blocked.insert(context) {
            return;
        }
        for card in 0..self.script.cards_per_attack {
            let color = CARD_COLORS[card as usize % CARD_COLORS.len()];
            battle.publish(BattleEvent::BlockAssigned {
                context,
                color,
                delta: self.script.block_per_card,
            });
        }
    }
}

fn verdict(battle: &Battle) -> Option<Verdict> {
    let roster = &battle.state().roster;
    let player_alive = roster
        .player_id()
        .and_then(|id| roster.get(id))
        .is_some_and(|c| c.is_alive());
    if !player_alive {
        return Some(Verdict::Defeat);
    }
    let enemies_alive = roster
        .iter()
        .any(|c| c.side == Side::Enemy && c.is_alive());
    (!enemies_alive).then_some(Verdict::Victory)
}

/// Runs `battle` to completion with the scripted player and presentation.
pub fn run(battle: &mut Battle, config: &SimConfig) -> Verdict {
    let mut player = ScriptedPlayer::new(config.player.clone(), config.turns);
    let mut presentation = Presentation::new(config.impact_delay);
    let budget = u64::from(config.turns.max(1)) * 10_000;

    battle.start();
    for frame in 0..budget {
        if let Some(verdict) = player.act(battle) {
            info!(target: "battle_sim", %verdict, frame, turn = battle.phase().turn, "battle over");
            return verdict;
        }
        battle.tick(config.frame);
        presentation.update(battle, config.frame);
    }

    warn!(
        target: "battle_sim",
        phase = %battle.phase().minor,
        queued = battle.queue().len(),
        "frame budget exhausted"
    );
    Verdict::Stalled
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_content::ContentFactory;
    use battle_core::BattleConfig;

    fn simulate(
        factory: &ContentFactory,
        encounter: &str,
        config: BattleConfig,
    ) -> (Battle, Verdict) {
        let encounter = factory.load_encounter(encounter).unwrap();
        let mut battle = Battle::builder()
            .config(config)
            .catalog(encounter.catalog)
            .roster(encounter.roster)
            .build()
            .unwrap();
        let verdict = run(&mut battle, &SimConfig::default());
        (battle, verdict)
    }

    #[test]
    fn bundled_encounters_finish() {
        let factory = ContentFactory::new(SimConfig::default().data_dir);
        let config = factory.load_config().unwrap();
        for name in ["wolf_den", "crypt"] {
            let (battle, verdict) = simulate(&factory, name, config.clone());
            assert_ne!(verdict, Verdict::Stalled, "{name}");
            assert!(battle.journal().total_recorded() > 0);
        }
    }

    #[test]
    fn manual_sequencing_is_driven_by_the_script() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("encounters")).unwrap();
        std::fs::write(
            dir.path().join("encounters/duel.ron"),
            r#"(
                attacks: [(id: 1, name: "Jab", damage: 3)],
                combatants: [
                    (id: 0, name: "Hero", side: Player, hp: 30),
                    (id: 1, name: "Bandit", side: Enemy, hp: 50, repertoire: Some((turns: [[1, 1]]))),
                ],
            )"#,
        )
        .unwrap();
        let factory = ContentFactory::new(dir.path());
        let config = BattleConfig {
            auto_advance_enemy_turn: false,
            ..BattleConfig::default()
        };

        let (battle, verdict) = simulate(&factory, "duel", config);
        assert_eq!(verdict, Verdict::RoundsElapsed);
        assert_eq!(battle.phase().turn, SimConfig::default().turns);
        // Two cards of 2 block against each 3-damage jab.
        let hero = battle.state().roster.get(EntityId::PLAYER).unwrap();
        assert_eq!(hero.hp, 30);
    }
}
