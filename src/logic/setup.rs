//! Setup phase: freeze the roster, shuffle the turn order, draw the first setter.

use crate::models::{Game, GameError, GamePhase, SetterReveal};
use rand::seq::SliceRandom;
use rand::Rng;

/// Setup -> Order. Needs at least 2 players. Letters are reset and the roster ids are
/// shuffled (Fisher-Yates) into the fixed turn order.
pub fn build_turn_order<R: Rng + ?Sized>(game: &mut Game, rng: &mut R) -> Result<(), GameError> {
    if game.phase != GamePhase::Setup {
        return Err(GameError::InvalidPhaseTransition { phase: game.phase });
    }
    if game.players.len() < 2 {
        return Err(GameError::InvalidRosterSize {
            players: game.players.len(),
        });
    }

    for p in &mut game.players {
        p.reset_letters();
    }
    let mut order: Vec<_> = game.players.iter().map(|p| p.id).collect();
    order.shuffle(rng);

    game.turn_order = order;
    game.current_setter_id = None;
    game.round = None;
    game.winner_id = None;
    game.reveal = None;
    game.phase = GamePhase::Order;
    Ok(())
}

/// Order -> Starting. The first setter is an independent uniform pick from the turn order,
/// not necessarily its head.
pub fn choose_first_setter<R: Rng + ?Sized>(
    game: &mut Game,
    rng: &mut R,
) -> Result<SetterReveal, GameError> {
    if game.phase != GamePhase::Order {
        return Err(GameError::InvalidPhaseTransition { phase: game.phase });
    }
    let setter_id = *game
        .turn_order
        .choose(rng)
        .ok_or(GameError::InvalidRosterSize { players: 0 })?;

    let reveal = SetterReveal {
        setter_id,
        setter_name: game.player_name(setter_id),
        turn_order_names: game.turn_order.iter().map(|id| game.player_name(*id)).collect(),
    };
    game.current_setter_id = Some(setter_id);
    game.reveal = Some(reveal.clone());
    game.phase = GamePhase::Starting;
    Ok(reveal)
}

/// Setup -> Starting in one step.
pub fn start_game<R: Rng + ?Sized>(game: &mut Game, rng: &mut R) -> Result<SetterReveal, GameError> {
    build_turn_order(game, rng)?;
    choose_first_setter(game, rng)
}
