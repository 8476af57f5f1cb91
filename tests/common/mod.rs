//! Shared fixtures for integration tests.

use skate_game_web::{Game, GamePhase, Player, PlayerId};

/// Game already started with turn order = roster order and the first player setting.
pub fn started_game(names: &[&str]) -> (Game, Vec<PlayerId>) {
    let players: Vec<Player> = names.iter().map(|n| Player::new(*n)).collect();
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let mut game = Game::with_players(players);
    game.turn_order = ids.clone();
    game.current_setter_id = Some(ids[0]);
    game.phase = GamePhase::Starting;
    (game, ids)
}

/// Give a player `n` letters directly.
pub fn give_letters(game: &mut Game, id: PlayerId, n: u8) {
    let p = game.get_player_mut(id).unwrap();
    for _ in 0..n {
        p.assign_letter();
    }
}

pub fn letters(game: &Game, id: PlayerId) -> u8 {
    game.get_player(id).unwrap().letter_count
}
