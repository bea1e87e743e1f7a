use starfall_combat::{
    process_enemy_turn, set_enemy_intent, CardData, CardInstance, Catalog, CombatConfig,
    CombatEngine, CombatPhase, CombatState, EffectKind, EnemyTemplate, IntentKind, PlayerSnapshot,
    RunSession, SeededRng,
};
use starfall_combat::game::Reward;

fn player(deck: Vec<CardInstance>) -> PlayerSnapshot {
    PlayerSnapshot {
        name: "Wayfarer".into(),
        image: String::new(),
        hull: 60,
        max_hull: 60,
        shield: 0,
        max_shield: 20,
        max_energy: 3,
        credits: 0,
        xp: 0,
        deck,
    }
}

fn deck_of(card_id: &str, count: usize) -> Vec<CardInstance> {
    (0..count)
        .map(|i| CardInstance::new(format!("{card_id}-{i}"), card_id))
        .collect()
}

fn scenario_catalog() -> Catalog {
    Catalog::builtin()
        .clone()
        .with_card(CardData::new("cannon", "Cannon", 1, 8, EffectKind::Damage))
        .with_enemy(EnemyTemplate {
            id: "husk".into(),
            name: "Husk".into(),
            image: String::new(),
            max_hp: 5,
            max_shield: 0,
            base_damage: 3,
            reward: Reward { credits: 30, xp: 12 },
            pattern: vec![IntentKind::Attack],
        })
}

fn first_in_hand(state: &CombatState) -> String {
    state
        .player
        .hand
        .first()
        .map(|card| card.instance_id.clone())
        .expect("hand should not be empty")
}

#[test]
fn shields_absorb_first_then_hull() {
    let engine = CombatEngine::new(scenario_catalog());
    let state = engine
        .create_combat(&player(deck_of("cannon", 6)), "scout_drone", 42)
        .expect("scout drone exists");
    assert_eq!(state.enemy.vitals.hp, 20);
    assert_eq!(state.enemy.vitals.shield, 10);

    let once = engine.play_card(&state, &first_in_hand(&state), None);
    assert_eq!(once.enemy.vitals.shield, 2);
    assert_eq!(once.enemy.vitals.hp, 20);

    let twice = engine.play_card(&once, &first_in_hand(&once), None);
    assert_eq!(twice.enemy.vitals.shield, 0);
    assert_eq!(twice.enemy.vitals.hp, 14);
    assert_eq!(twice.phase, CombatPhase::PlayerInput);
}

#[test]
fn last_maneuver_in_hand_draws_exactly_one_card() {
    let engine = CombatEngine::builtin();
    let state = engine
        .create_combat(&player(deck_of("evasive_burn", 6)), "scout_drone", 7)
        .expect("scout drone exists");
    assert_eq!(state.player.hand.len(), 5);
    assert_eq!(state.player.draw_pile.len(), 1);

    let mut current = state;
    for _ in 0..4 {
        current = engine.play_card(&current, &first_in_hand(&current), None);
        assert_eq!(current.player.draw_pile.len(), 1, "no draw while cards remain");
    }

    let log_before = current.log.len();
    let last = engine.play_card(&current, &first_in_hand(&current), None);
    assert_eq!(last.player.hand.len(), 1);
    assert!(last.player.draw_pile.is_empty());
    assert_eq!(last.player.resources.maneuvers, 5);
    assert!(last.queue.is_empty());

    let new_lines = &last.log[log_before..];
    let gain = new_lines
        .iter()
        .position(|line| line.contains("gains 1 maneuver"))
        .expect("resource gain is logged");
    let draw = new_lines
        .iter()
        .position(|line| line.contains("draws 1 card"))
        .expect("automatic draw is logged");
    assert!(gain < draw, "draw resolves after the resource gain");
    assert_eq!(
        new_lines.iter().filter(|line| line.contains("draws")).count(),
        1
    );
}

#[test]
fn killing_the_enemy_ends_combat_in_the_same_call() {
    let engine = CombatEngine::new(scenario_catalog());
    let state = engine
        .create_combat(&player(deck_of("cannon", 5)), "husk", 3)
        .expect("husk exists");

    let won = engine.play_card(&state, &first_in_hand(&state), None);
    assert_eq!(won.phase, CombatPhase::GameOver);
    assert_eq!(won.victory, Some(true));
    assert!(won.enemy.vitals.dead);
    assert_eq!(won.enemy.vitals.hp, 0);

    // 终局之后不再接受任何输入
    assert_eq!(engine.play_card(&won, &first_in_hand(&won), None), won);
    assert_eq!(engine.resolve_turn(&won), won);

    let settlement = won.settlement().expect("finished combat settles");
    assert!(settlement.victory);
    assert_eq!(settlement.credits, 30);
    assert_eq!(settlement.xp, 12);
    assert_eq!(settlement.hull, 60);

    let mut session = RunSession::new();
    let mut snapshot = player(deck_of("cannon", 5));
    session.apply_settlement(&mut snapshot, &settlement);
    assert_eq!(snapshot.credits, 30);
    assert_eq!(session.victories, 1);
}

#[test]
fn playing_an_unknown_instance_is_a_no_op() {
    let engine = CombatEngine::builtin();
    let state = engine
        .create_combat(&player(deck_of("laser_volley", 8)), "void_corsair", 11)
        .expect("corsair exists");
    assert_eq!(engine.play_card(&state, "not-in-hand", None), state);
}

#[test]
fn end_of_turn_draw_terminates_with_empty_piles() {
    let engine = CombatEngine::builtin();
    let state = engine
        .create_combat(&player(Vec::new()), "scout_drone", 5)
        .expect("scout drone exists");
    assert!(state.player.hand.is_empty());

    let next = engine.resolve_turn(&state);
    assert_eq!(next.turn, 2);
    assert!(next.player.hand.is_empty());
    assert_eq!(next.phase, CombatPhase::PlayerInput);
}

#[test]
fn cards_are_conserved_across_turns() {
    let engine = CombatEngine::builtin();
    let mut deck = deck_of("laser_volley", 4);
    deck.extend(deck_of("nanite_swarm", 2));
    deck.extend(deck_of("evasive_burn", 3));
    deck.extend(deck_of("deflector", 3));
    let total = deck.len();

    let mut state = engine
        .create_combat(&player(deck), "dreadnought", 2024)
        .expect("dreadnought exists");
    for _ in 0..6 {
        for card in state.player.hand.clone() {
            state = engine.play_card(&state, &card.instance_id, None);
        }
        assert_eq!(state.player.card_count(), total);
        state = engine.resolve_turn(&state);
        assert_eq!(state.player.card_count(), total);
        assert!(state.integrity_check().is_ok());
        if state.phase == CombatPhase::GameOver {
            break;
        }
    }
}

#[test]
fn enemy_pattern_repeats_with_its_period() {
    let engine = CombatEngine::builtin();
    let config = CombatConfig::default();
    let mut state = engine
        .create_combat(&player(Vec::new()), "void_corsair", 77)
        .expect("corsair exists");
    let period = state.enemy.pattern.len();

    let mut rng = SeededRng::from_state(state.rng_state);
    let mut executed = Vec::new();
    for _ in 0..2 * period {
        set_enemy_intent(&mut state, &config);
        let turn = process_enemy_turn(&mut state, &mut rng, &config);
        executed.push(turn.intent.map(|intent| intent.kind));
    }

    for i in 0..period {
        assert_eq!(executed[i], executed[i + period]);
        assert_eq!(executed[i], Some(state.enemy.pattern[i]));
    }
}

#[test]
fn buff_raises_the_next_attack_preview() {
    let engine = CombatEngine::builtin();
    let mut state = engine
        .create_combat(&player(Vec::new()), "void_corsair", 8)
        .expect("corsair exists");
    // ATTACK, BUFF, ATTACK_DEFEND, DEFEND
    state = engine.resolve_turn(&state);
    assert_eq!(
        state.enemy.intent.as_ref().map(|intent| intent.kind),
        Some(IntentKind::Buff)
    );
    state = engine.resolve_turn(&state);
    assert_eq!(state.enemy.attack_buff, 2);
    let split = state.enemy.intent.clone().expect("corsair plans a split attack");
    assert_eq!(split.kind, IntentKind::AttackDefend);
    assert_eq!(split.damage, 6, "ceil((7 + 2) * 60%)");

    state = engine.resolve_turn(&state);
    assert_eq!(state.enemy.attack_buff, 0, "attacks consume the buff");
}

#[test]
fn credits_from_cards_persist_in_settlement() {
    let engine = CombatEngine::new(scenario_catalog());
    let mut deck = deck_of("salvage_drone", 1);
    deck.extend(deck_of("cannon", 4));
    let state = engine
        .create_combat(&player(deck), "husk", 13)
        .expect("husk exists");

    let salvage = state
        .player
        .hand
        .iter()
        .find(|card| card.card_id == "salvage_drone")
        .map(|card| card.instance_id.clone())
        .expect("whole deck is drawn");
    let state = engine.play_card(&state, &salvage, None);
    assert_eq!(state.player.credits_earned, 15);
    assert_eq!(state.player.exile_pile.len(), 1);

    let cannon = state
        .player
        .hand
        .iter()
        .find(|card| card.card_id == "cannon")
        .map(|card| card.instance_id.clone())
        .expect("cannon in hand");
    let state = engine.play_card(&state, &cannon, None);
    let settlement = state.settlement().expect("husk is destroyed");
    assert_eq!(settlement.credits, 45);
}
