use battle_core::{
    AttackCatalog, AttackDefinition, AttackHooks, AttackId, BattleConfig, CardColor, Combatant,
    ConditionKind, ContextId, EntityId, HookLibrary, MinorPhase, PassiveKind, Repertoire, Roster,
    SelectionMode, Side,
};
use battle_runtime::{Battle, BattleEvent, BattleEventKind, ResolutionStage};

const BRUTE: EntityId = EntityId(1);

fn duel_with(config: BattleConfig, attack: AttackDefinition, hero: Combatant) -> Battle {
    let id = attack.id;
    let mut catalog = AttackCatalog::new();
    catalog.register(attack).unwrap();
    let roster = Roster::new(vec![
        hero,
        Combatant::new(BRUTE, "brute", Side::Enemy, 40)
            .with_repertoire(Repertoire::new(vec![vec![id]], SelectionMode::Cycle)),
    ])
    .unwrap();
    Battle::builder()
        .config(config)
        .catalog(catalog)
        .roster(roster)
        .build()
        .unwrap()
}

fn duel(attack: AttackDefinition) -> Battle {
    duel_with(BattleConfig::default(), attack, hero())
}

fn hero() -> Combatant {
    Combatant::new(EntityId::PLAYER, "hero", Side::Player, 30)
}

/// Starts the battle and runs the enemy turn up to the Block phase.
fn enter_block(battle: &mut Battle) -> ContextId {
    battle.start();
    battle.publish(BattleEvent::phase_request(MinorPhase::EnemyStart));
    battle.tick(0.0);
    assert_eq!(battle.phase().minor, MinorPhase::Block);
    let (_, context) = battle.state().roster.next_planned().unwrap();
    context
}

fn block(battle: &mut Battle, context: ContextId, delta: u32) {
    battle.publish(BattleEvent::BlockAssigned {
        context,
        color: CardColor::Red,
        delta,
    });
}

fn resolve(battle: &mut Battle) {
    battle.publish(BattleEvent::phase_request(MinorPhase::EnemyAttack));
}

fn impact(battle: &mut Battle, context: ContextId) {
    battle.publish(BattleEvent::ImpactNow { context });
}

fn hp(battle: &Battle, id: EntityId) -> u32 {
    battle.state().roster.get(id).unwrap().hp
}

fn hp_changes(battle: &Battle) -> Vec<BattleEvent> {
    battle
        .journal()
        .of_kind(BattleEventKind::HpChanged)
        .cloned()
        .collect()
}

fn resolved_condition(battle: &Battle) -> Option<bool> {
    battle
        .journal()
        .of_kind(BattleEventKind::AttackResolved)
        .find_map(|event| match event {
            BattleEvent::AttackResolved { condition_met, .. } => Some(*condition_met),
            _ => None,
        })
}

#[test]
fn partial_block_lets_the_rest_through() {
    let mut battle = duel(AttackDefinition::new(AttackId(1), "smash", 10));
    let context = enter_block(&mut battle);

    block(&mut battle, context, 4);
    let progress = battle.state().progress(context).unwrap();
    assert_eq!(progress.assigned_block_total, 4);
    assert_eq!(progress.actual_damage, 6);

    resolve(&mut battle);
    assert_eq!(battle.awaiting_impacts(), vec![context]);
    assert_eq!(hp(&battle, EntityId::PLAYER), 30, "damage waits for impact");

    impact(&mut battle, context);
    assert_eq!(
        hp_changes(&battle),
        vec![BattleEvent::HpChanged {
            target: EntityId::PLAYER,
            delta: -6,
            hp: 24,
        }]
    );
    assert!(battle.awaiting_impacts().is_empty());
    assert!(battle.state().progress(context).is_none());
    assert_eq!(battle.state().hits.get(&AttackId(1)), Some(&1));

    battle.tick(0.0);
    assert_eq!(battle.phase().minor, MinorPhase::PlayerStart);
}

#[test]
fn overblock_clamps_damage_at_zero() {
    let mut battle = duel(AttackDefinition::new(AttackId(1), "smash", 10));
    let context = enter_block(&mut battle);

    block(&mut battle, context, 4);
    block(&mut battle, context, 7);

    let progress = battle.state().progress(context).unwrap();
    assert_eq!(progress.assigned_block_total, 11);
    assert_eq!(progress.actual_damage, 0);
    assert_eq!(progress.total_prevented_damage, 11);
    assert!(progress.is_blocked());

    resolve(&mut battle);
    impact(&mut battle, context);
    assert!(hp_changes(&battle).is_empty());
    assert!(battle.state().hits.is_empty(), "blocked attacks never count as hits");
}

#[test]
fn unknown_impact_is_ignored() {
    let mut battle = duel(AttackDefinition::new(AttackId(1), "smash", 10));
    let context = enter_block(&mut battle);
    resolve(&mut battle);

    let recorded = battle.journal().len();
    impact(&mut battle, ContextId(0xdead_beef));

    assert_eq!(battle.journal().len(), recorded + 1);
    assert_eq!(hp(&battle, EntityId::PLAYER), 30);
    assert_eq!(battle.awaiting_impacts(), vec![context]);
    assert_eq!(
        battle.resolution(context).map(|r| r.stage),
        Some(ResolutionStage::AwaitingImpact)
    );
}

#[test]
fn intents_gathered_before_impact_apply_once() {
    let mut hero = hero();
    hero.passives.apply(PassiveKind::Aegis, 1);
    let mut battle = duel_with(
        BattleConfig::default(),
        AttackDefinition::new(AttackId(1), "feint", 0),
        hero,
    );
    let context = enter_block(&mut battle);
    block(&mut battle, context, 2);
    resolve(&mut battle);

    battle.publish(BattleEvent::DamageIntent {
        source: BRUTE,
        target: EntityId::PLAYER,
        amount: 3,
        attack: None,
        context: Some(context),
    });
    battle.publish(BattleEvent::DamageIntent {
        source: BRUTE,
        target: EntityId::PLAYER,
        amount: 5,
        attack: None,
        context: None,
    });
    let pending = battle.resolution(context).unwrap();
    assert_eq!(pending.pending_damage, 8);
    assert_eq!(pending.intents, 2);
    assert!(hp_changes(&battle).is_empty());

    impact(&mut battle, context);

    // 8 incoming: 2 absorbed by block, 1 by aegis.
    assert_eq!(
        hp_changes(&battle),
        vec![BattleEvent::HpChanged {
            target: EntityId::PLAYER,
            delta: -5,
            hp: 25,
        }]
    );
    let hero = battle.state().roster.get(EntityId::PLAYER).unwrap();
    assert_eq!(hero.passives.amount(PassiveKind::Aegis), 0);
}

#[test]
fn intent_for_a_settled_context_lands_immediately() {
    let mut battle = duel(AttackDefinition::new(AttackId(1), "smash", 10));
    enter_block(&mut battle);

    battle.publish(BattleEvent::DamageIntent {
        source: BRUTE,
        target: EntityId::PLAYER,
        amount: 3,
        attack: Some(AttackId(1)),
        context: Some(ContextId(42)),
    });

    assert_eq!(hp(&battle, EntityId::PLAYER), 27);
    assert_eq!(battle.journal().count(BattleEventKind::AttackHit), 1);
}

#[test]
fn late_prevention_changes_damage_but_not_the_frozen_condition() {
    let mut battle = duel(
        AttackDefinition::new(AttackId(1), "lunge", 6).with_condition(ConditionKind::MetOnHit),
    );
    let context = enter_block(&mut battle);
    resolve(&mut battle);
    assert!(!battle.resolution(context).unwrap().condition_met);

    battle.publish(BattleEvent::ApplyPassive {
        target: EntityId::PLAYER,
        kind: PassiveKind::Aegis,
        delta: 10,
    });
    let live = battle.state().progress(context).unwrap();
    assert!(live.is_condition_met);
    assert_eq!(live.actual_damage, 0);

    impact(&mut battle, context);

    assert_eq!(hp(&battle, EntityId::PLAYER), 30);
    assert_eq!(resolved_condition(&battle), Some(false));
    let hero = battle.state().roster.get(EntityId::PLAYER).unwrap();
    assert_eq!(hero.passives.amount(PassiveKind::Aegis), 4);
}

#[test]
fn frozen_block_suppresses_on_hit_after_a_late_unblock() {
    let corrode = HookLibrary::builtin().effect("corrode").unwrap();
    let mut battle = duel(AttackDefinition::new(AttackId(1), "bite", 6).with_hooks(AttackHooks {
        on_hit: Some(corrode),
        ..AttackHooks::default()
    }));
    let context = enter_block(&mut battle);
    block(&mut battle, context, 6);
    resolve(&mut battle);
    assert!(battle.resolution(context).unwrap().blocked_at_resolution);

    battle.publish(BattleEvent::BlockRemoved {
        context,
        color: CardColor::Red,
        delta: 6,
    });
    impact(&mut battle, context);

    assert_eq!(hp(&battle, EntityId::PLAYER), 24);
    assert_eq!(battle.journal().count(BattleEventKind::AttackHit), 0);
    let hero = battle.state().roster.get(EntityId::PLAYER).unwrap();
    assert!(!hero.passives.has(PassiveKind::Corrosion));
}

#[test]
fn unblocked_hit_runs_on_hit_hook() {
    let corrode = HookLibrary::builtin().effect("corrode").unwrap();
    let mut battle = duel(AttackDefinition::new(AttackId(1), "bite", 6).with_hooks(AttackHooks {
        on_hit: Some(corrode),
        ..AttackHooks::default()
    }));
    let context = enter_block(&mut battle);
    resolve(&mut battle);
    impact(&mut battle, context);

    assert_eq!(hp(&battle, EntityId::PLAYER), 24);
    let hero = battle.state().roster.get(EntityId::PLAYER).unwrap();
    assert_eq!(hero.passives.amount(PassiveKind::Corrosion), 1);
}

#[test]
fn missing_impact_falls_back_after_the_timeout() {
    let mut battle = duel_with(
        BattleConfig::default().with_impact_timeout(1.0),
        AttackDefinition::new(AttackId(1), "smash", 10),
        hero(),
    );
    let context = enter_block(&mut battle);
    resolve(&mut battle);

    battle.tick(0.5);
    battle.tick(0.6);
    assert_eq!(battle.awaiting_impacts(), vec![context]);

    battle.tick(0.6);
    assert!(battle.awaiting_impacts().is_empty());
    assert_eq!(hp(&battle, EntityId::PLAYER), 20);
    assert_eq!(battle.phase().minor, MinorPhase::PlayerStart);
}

#[test]
fn without_a_timeout_the_turn_waits_for_impact() {
    let mut battle = duel(AttackDefinition::new(AttackId(1), "smash", 10));
    let context = enter_block(&mut battle);
    resolve(&mut battle);

    for _ in 0..50 {
        battle.tick(1.0);
    }
    assert_eq!(battle.phase().minor, MinorPhase::EnemyAttack);
    assert_eq!(battle.awaiting_impacts(), vec![context]);
    assert_eq!(battle.queue().active_name(), Some("await_impact"));
}

#[test]
fn overwhelming_corrosion_strips_block_without_wrapping() {
    let mut battle = duel(AttackDefinition::new(AttackId(1), "smash", 10));
    let context = enter_block(&mut battle);
    block(&mut battle, context, 2);

    for delta in [2_147_483_648, 3_000_000_000] {
        battle.publish(BattleEvent::ApplyPassive {
            target: EntityId::PLAYER,
            kind: PassiveKind::Corrosion,
            delta,
        });
        let progress = battle.state().progress(context).unwrap();
        assert_eq!(progress.assigned_block_total, 0);
        assert_eq!(progress.actual_damage, 10);
        assert!(!progress.is_blocked());
    }

    resolve(&mut battle);
    impact(&mut battle, context);
    assert_eq!(hp(&battle, EntityId::PLAYER), 20);
}
