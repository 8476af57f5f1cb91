//! Integration tests for the engine: command surface, start sequence and snapshot saving.

mod common;

use common::{give_letters, started_game};
use skate_game_web::{
    Engine, Game, GameError, GamePhase, MemoryStore, Player, RoundMode, SnapshotStore, StoreError,
};
use std::collections::HashSet;

fn engine_with(names: &[&str], seed: u64) -> Engine<MemoryStore> {
    let mut engine = Engine::with_seed(MemoryStore::new(), seed);
    for name in names {
        engine.add_player(name).unwrap();
    }
    engine
}

/// Store that always fails to save.
struct BrokenStore;

impl SnapshotStore for BrokenStore {
    fn save(&self, _game: &Game) -> Result<(), StoreError> {
        Err(StoreError::LockPoisoned)
    }

    fn load(&self) -> Result<Option<Game>, StoreError> {
        Err(StoreError::LockPoisoned)
    }
}

#[test]
fn start_requires_two_players() {
    let mut engine = engine_with(&["Alice"], 1);
    assert_eq!(
        engine.start_game(),
        Err(GameError::InvalidRosterSize { players: 1 })
    );
    assert_eq!(engine.snapshot().phase, GamePhase::Setup);

    let mut empty = engine_with(&[], 1);
    assert_eq!(
        empty.start_game(),
        Err(GameError::InvalidRosterSize { players: 0 })
    );
}

#[test]
fn start_builds_turn_order_and_reveals_setter() {
    let mut engine = engine_with(&["Alice", "Bob", "Cara", "Dan"], 7);
    let reveal = engine.start_game().unwrap();
    let game = engine.snapshot();

    assert_eq!(game.phase, GamePhase::Starting);
    let roster: HashSet<_> = game.players.iter().map(|p| p.id).collect();
    let order: HashSet<_> = game.turn_order.iter().copied().collect();
    assert_eq!(game.turn_order.len(), 4);
    assert_eq!(roster, order);

    assert_eq!(game.current_setter_id, Some(reveal.setter_id));
    assert!(game.turn_order.contains(&reveal.setter_id));
    assert_eq!(reveal.setter_name, game.player_name(reveal.setter_id));
    assert_eq!(reveal.turn_order_names.len(), 4);
    assert_eq!(game.reveal.as_ref(), Some(&reveal));

    // Starting twice is not a valid transition.
    assert_eq!(
        engine.start_game(),
        Err(GameError::InvalidPhaseTransition {
            phase: GamePhase::Starting
        })
    );
}

#[test]
fn same_seed_same_start() {
    let mut a = engine_with(&["Alice", "Bob", "Cara"], 99);
    let mut b = Engine::with_seed(MemoryStore::new(), 99);
    let names: Vec<_> = a.snapshot().players.iter().map(|p| p.name.clone()).collect();
    for name in &names {
        b.add_player(name).unwrap();
    }
    let ra = a.start_game().unwrap();
    let rb = b.start_game().unwrap();
    assert_eq!(ra.turn_order_names, rb.turn_order_names);
    assert_eq!(ra.setter_name, rb.setter_name);
}

#[test]
fn roster_edits_follow_setup_rules() {
    let mut engine = engine_with(&["Alice", "Bob"], 3);
    assert_eq!(engine.add_player("   "), Ok(None));
    assert_eq!(engine.snapshot().players.len(), 2);

    let cara = engine.add_player("  Cara ").unwrap().unwrap();
    assert_eq!(engine.snapshot().get_player(cara).unwrap().name, "Cara");

    let bob = engine.snapshot().players[1].id;
    engine.rename_player(bob, "").unwrap();
    assert_eq!(engine.snapshot().players[1].name, "Player 2");
    engine.rename_player(bob, " Robert ").unwrap();
    assert_eq!(engine.snapshot().players[1].name, "Robert");

    engine.remove_player(cara).unwrap();
    assert_eq!(engine.remove_player(cara), Err(GameError::PlayerNotFound(cara)));

    engine.start_game().unwrap();
    assert!(matches!(
        engine.add_player("Late"),
        Err(GameError::InvalidPhaseTransition { .. })
    ));
    assert!(matches!(
        engine.remove_player(bob),
        Err(GameError::InvalidPhaseTransition { .. })
    ));
    assert!(matches!(
        engine.set_round_mode(RoundMode::SetterOnly),
        Err(GameError::InvalidPhaseTransition { .. })
    ));
    // Names stay editable mid-game.
    engine.rename_player(bob, "Bobby").unwrap();
    assert_eq!(engine.snapshot().players.len(), 2);
}

#[test]
fn reset_round_keeps_roster_and_clears_letters() {
    let (game, ids) = started_game(&["Alice", "Bob"]);
    let mut engine = Engine::from_game(game, MemoryStore::new());
    engine.open_round("Kickflip").unwrap();
    engine.record_setter_attempt(false).unwrap();
    assert_eq!(engine.snapshot().get_player(ids[0]).unwrap().letter_count, 1);

    engine.reset_round().unwrap();
    let game = engine.snapshot();
    assert_eq!(game.phase, GamePhase::Setup);
    assert_eq!(game.players.len(), 2);
    assert!(game.players.iter().all(|p| p.letter_count == 0 && !p.eliminated));
    assert!(game.turn_order.is_empty());
    assert!(game.round.is_none());
    assert!(game.history.is_empty());

    engine.start_game().unwrap();
}

#[test]
fn new_game_clears_everything_but_the_id() {
    let mut engine = engine_with(&["Alice", "Bob"], 5);
    engine.set_round_mode(RoundMode::SetterOnly).unwrap();
    engine.start_game().unwrap();
    let id = engine.snapshot().id;

    engine.new_game().unwrap();
    let game = engine.snapshot();
    assert_eq!(game.id, id);
    assert_eq!(game.phase, GamePhase::Setup);
    assert!(game.players.is_empty());
    assert_eq!(game.mode, RoundMode::SetterAndDefenders);
}

#[test]
fn every_accepted_command_is_saved() {
    let store = MemoryStore::new();
    let mut engine = Engine::with_seed(&store, 11);
    engine.add_player("Alice").unwrap();
    assert_eq!(store.load().unwrap().as_ref(), Some(engine.snapshot()));

    engine.add_player("Bob").unwrap();
    engine.start_game().unwrap();
    engine.open_round("Ollie").unwrap();
    assert_eq!(store.load().unwrap().as_ref(), Some(engine.snapshot()));

    // Rejected command: nothing new is saved.
    let saved = store.json();
    assert!(engine.record_defense_attempt(true).is_err());
    assert_eq!(store.json(), saved);
}

#[test]
fn blank_add_is_not_saved() {
    let store = MemoryStore::new();
    let mut engine = Engine::with_seed(&store, 2);
    engine.add_player("").unwrap();
    assert!(store.json().is_none());
}

#[test]
fn failing_store_does_not_affect_the_game() {
    let mut engine = Engine::with_seed(BrokenStore, 4);
    engine.add_player("Alice").unwrap();
    engine.add_player("Bob").unwrap();
    engine.start_game().unwrap();
    engine.open_round("Kickflip").unwrap();
    engine.record_setter_attempt(false).unwrap();

    let game = engine.snapshot();
    assert_eq!(game.phase, GamePhase::RoundComplete);
    assert_eq!(game.players.iter().map(|p| p.letter_count).sum::<u8>(), 1);
}

#[test]
fn resume_continues_mid_round() {
    let store = MemoryStore::new();
    let (game, ids) = started_game(&["Alice", "Bob", "Cara"]);
    {
        let mut engine = Engine::from_game(game, &store);
        engine.open_round("Ollie").unwrap();
        engine.record_setter_attempt(true).unwrap();
        engine.record_defense_attempt(false).unwrap();
    }

    let mut engine = Engine::resume(&store).expect("saved game");
    assert_eq!(engine.snapshot().phase, GamePhase::AwaitingDefenders);
    engine.record_defense_attempt(true).unwrap();
    assert_eq!(engine.snapshot().phase, GamePhase::RoundComplete);
    assert_eq!(engine.snapshot().get_player(ids[1]).unwrap().letter_count, 1);
}

#[test]
fn restore_without_saved_game_is_fresh_setup() {
    assert!(Engine::resume(MemoryStore::new()).is_none());
    assert!(Engine::resume(BrokenStore).is_none());

    let engine = Engine::restore(MemoryStore::new());
    assert_eq!(engine.snapshot().phase, GamePhase::Setup);
    assert!(engine.snapshot().players.is_empty());
}

#[test]
fn invalid_snapshots_are_discarded() {
    let (mut game, ids) = started_game(&["Alice", "Bob"]);
    give_letters(&mut game, ids[0], 2);
    let valid = serde_json::to_value(&game).unwrap();
    assert!(Engine::resume(MemoryStore::from_json(valid.to_string())).is_some());

    let mut out_of_range = valid.clone();
    out_of_range["players"][0]["letter_count"] = 7.into();
    let mut overflow = valid.clone();
    overflow["players"][0]["letter_count"] = 300.into();
    let mut unknown_phase = valid.clone();
    unknown_phase["phase"] = "warming_up".into();
    let mut duplicate = valid.clone();
    duplicate["players"][1]["id"] = valid["players"][0]["id"].clone();
    let mut missing_id = valid.clone();
    missing_id["players"][0].as_object_mut().unwrap().remove("id");
    let mut dangling_setter = valid.clone();
    dangling_setter["current_setter_id"] = Player::new("ghost").id.to_string().into();
    let mut flag_mismatch = valid.clone();
    flag_mismatch["players"][1]["eliminated"] = true.into();

    let mut seq_overflow = valid.clone();
    seq_overflow["history"] = serde_json::json!([{
        "seq": u64::MAX,
        "at": "2024-05-01T12:00:00Z",
        "kind": "round_closed",
        "trick": "Ollie",
        "next_setter_id": null,
        "next_setter_name": null,
    }]);

    for broken in [
        out_of_range,
        overflow,
        unknown_phase,
        duplicate,
        missing_id,
        dangling_setter,
        flag_mismatch,
        seq_overflow,
    ] {
        assert_discarded(broken);
    }

    let garbage = MemoryStore::from_json("not a snapshot");
    assert!(Engine::resume(&garbage).is_none());
}

fn assert_discarded(broken: serde_json::Value) {
    let store = MemoryStore::from_json(broken.to_string());
    assert!(Engine::resume(&store).is_none(), "accepted {}", broken);
    let engine = Engine::restore(&store);
    assert_eq!(engine.snapshot().phase, GamePhase::Setup);
    assert!(engine.snapshot().players.is_empty());
}

/// Alice set "Ollie" and landed it; Bob and Cara still have to answer.
fn mid_round_snapshot() -> (serde_json::Value, Vec<skate_game_web::PlayerId>) {
    let (game, ids) = started_game(&["Alice", "Bob", "Cara"]);
    let mut engine = Engine::from_game(game, MemoryStore::new());
    engine.open_round("Ollie").unwrap();
    engine.record_setter_attempt(true).unwrap();
    (serde_json::to_value(engine.snapshot()).unwrap(), ids)
}

#[test]
fn inconsistent_round_snapshots_are_discarded() {
    let (valid, ids) = mid_round_snapshot();
    assert!(Engine::resume(MemoryStore::from_json(valid.to_string())).is_some());

    let mut history_gap = valid.clone();
    history_gap["history"][0]["seq"] = 2.into();
    let mut history_overflow = valid.clone();
    history_overflow["history"][0]["seq"] = u64::MAX.into();
    let mut setter_mismatch = valid.clone();
    setter_mismatch["current_setter_id"] = ids[1].to_string().into();
    let mut setter_defends = valid.clone();
    setter_defends["round"]["defender_queue"][1] = ids[0].to_string().into();
    let mut repeated_defender = valid.clone();
    repeated_defender["round"]["defender_queue"][1] = ids[1].to_string().into();

    for broken in [
        history_gap,
        history_overflow,
        setter_mismatch,
        setter_defends,
        repeated_defender,
    ] {
        assert_discarded(broken);
    }
}

#[test]
fn eliminated_setter_is_rejected() {
    let (mut game, ids) = started_game(&["Alice", "Bob", "Cara"]);
    give_letters(&mut game, ids[0], 5);
    assert!(game.validate().is_err());
    assert_discarded(serde_json::to_value(&game).unwrap());

    // Same roster, but the active Bob sets: fine.
    game.current_setter_id = Some(ids[1]);
    assert_eq!(game.validate(), Ok(()));
}

#[test]
fn won_snapshot_must_name_the_last_player_standing() {
    let (mut game, ids) = started_game(&["Alice", "Bob"]);
    give_letters(&mut game, ids[0], 4);
    let mut engine = Engine::from_game(game, MemoryStore::new());
    engine.open_round("Kickflip").unwrap();
    engine.record_setter_attempt(false).unwrap();
    assert_eq!(engine.snapshot().phase, GamePhase::Won);

    let valid = serde_json::to_value(engine.snapshot()).unwrap();
    let resumed = Engine::resume(MemoryStore::from_json(valid.to_string())).unwrap();
    assert_eq!(resumed.snapshot().winner_id, Some(ids[1]));

    let mut wrong_winner = valid.clone();
    wrong_winner["winner_id"] = ids[0].to_string().into();
    assert_discarded(wrong_winner);
}

#[test]
fn resumed_history_keeps_numbering() {
    let (valid, _) = mid_round_snapshot();
    let mut engine = Engine::resume(MemoryStore::from_json(valid.to_string())).unwrap();
    engine.record_defense_attempt(false).unwrap();
    engine.record_defense_attempt(true).unwrap();

    let seqs: Vec<u64> = engine.snapshot().history.events().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (1..=seqs.len() as u64).collect::<Vec<_>>());
    assert_eq!(seqs.len(), 5);
}
