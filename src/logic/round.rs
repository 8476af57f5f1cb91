//! Round state machine: open a round, record the setter's attempt, then each defender's.
//!
//! Transitions:
//! - `Starting | RoundComplete` --open_round--> `AwaitingSetterAttempt`
//! - `AwaitingSetterAttempt` --missed--> letter for the setter, round closes
//! - `AwaitingSetterAttempt` --landed, no defenders--> round closes
//! - `AwaitingSetterAttempt` --landed--> `AwaitingDefenders`
//! - `AwaitingDefenders` --attempt--> letter on a miss, next defender; closes after the last
//!
//! Closing a round moves to `RoundComplete`, or to `Won` when one player is left.

use crate::logic::standings::standings;
use crate::models::{Game, GameError, GamePhase, HistoryKind, PlayerId, Round, RoundMode};

/// Open a round with the current setter. Defenders are captured now, in turn order after
/// the setter, and are not re-filtered until the round closes.
pub fn open_round(game: &mut Game, trick: &str) -> Result<(), GameError> {
    if game.phase.round_open() {
        return Err(GameError::RoundAlreadyOpen);
    }
    match game.phase {
        GamePhase::Starting | GamePhase::RoundComplete => {}
        GamePhase::Won => return Err(GameError::GameAlreadyWon),
        phase => return Err(GameError::InvalidPhaseTransition { phase }),
    }
    let s = standings(&game.players);
    if s.winner.is_some() {
        return Err(GameError::GameAlreadyWon);
    }
    if s.remaining.len() < 2 {
        return Err(GameError::InvalidPhaseTransition { phase: game.phase });
    }
    let trick = trick.trim();
    if trick.is_empty() {
        return Err(GameError::EmptyTrick);
    }
    let setter_id = game
        .current_setter_id
        .ok_or(GameError::InvalidPhaseTransition { phase: game.phase })?;

    let defender_queue = match game.mode {
        RoundMode::SetterAndDefenders => active_after(game, setter_id),
        RoundMode::SetterOnly => Vec::new(),
    };
    log::debug!(
        "Round opened: {} sets {:?} against {} defender(s)",
        game.player_name(setter_id),
        trick,
        defender_queue.len()
    );
    game.round = Some(Round::new(trick, setter_id, defender_queue));
    game.phase = GamePhase::AwaitingSetterAttempt;
    Ok(())
}

/// The setter tried the trick. A miss costs a letter and closes the round.
pub fn record_setter_attempt(game: &mut Game, landed: bool) -> Result<(), GameError> {
    if game.phase != GamePhase::AwaitingSetterAttempt {
        return Err(GameError::InvalidPhaseTransition { phase: game.phase });
    }
    let (setter_id, trick, no_defenders) = match &game.round {
        Some(r) => (r.setter_id, r.trick.clone(), r.defender_queue.is_empty()),
        None => return Err(GameError::InvalidPhaseTransition { phase: game.phase }),
    };

    let player_name = game.player_name(setter_id);
    game.history.record(HistoryKind::SetAttempt {
        player_id: setter_id,
        player_name,
        trick,
        landed,
    });

    if !landed {
        assign_letter(game, setter_id);
        close_round(game);
    } else if no_defenders {
        close_round(game);
    } else {
        game.phase = GamePhase::AwaitingDefenders;
    }
    Ok(())
}

/// The current defender tried the trick. A miss costs a letter; the round closes once every
/// defender in the queue has had a go.
pub fn record_defense_attempt(game: &mut Game, landed: bool) -> Result<(), GameError> {
    if game.phase != GamePhase::AwaitingDefenders {
        return Err(GameError::InvalidPhaseTransition { phase: game.phase });
    }
    let (defender_id, trick) = match &game.round {
        Some(r) => match r.current_defender() {
            Some(id) => (id, r.trick.clone()),
            None => return Err(GameError::InvalidPhaseTransition { phase: game.phase }),
        },
        None => return Err(GameError::InvalidPhaseTransition { phase: game.phase }),
    };

    let player_name = game.player_name(defender_id);
    game.history.record(HistoryKind::DefenseAttempt {
        player_id: defender_id,
        player_name,
        trick,
        landed,
    });
    if !landed {
        assign_letter(game, defender_id);
    }

    let exhausted = game.round.as_mut().map_or(true, Round::advance_defender);
    if exhausted || standings(&game.players).winner.is_some() {
        close_round(game);
    }
    Ok(())
}

/// Give one letter and log it; eliminates on the fifth.
fn assign_letter(game: &mut Game, player_id: PlayerId) {
    let Some(player) = game.get_player_mut(player_id) else {
        return;
    };
    let newly_eliminated = player.assign_letter();
    let event = HistoryKind::LetterAssigned {
        player_id,
        player_name: player.name.clone(),
        letter: player.last_letter().unwrap_or('E'),
        letter_count: player.letter_count,
        eliminated: player.eliminated,
    };
    if newly_eliminated {
        log::info!("{} spelled SKATE and is eliminated", player.name);
    }
    game.history.record(event);
}

/// Close the open round: next setter is the first active player after the current setter
/// in turn order (wrapping), unless only one player is left, in which case the game is won.
fn close_round(game: &mut Game) {
    let trick = game.round.as_ref().map(|r| r.trick.clone()).unwrap_or_default();
    let winner_id = standings(&game.players).winner.map(|p| p.id);

    if let Some(winner_id) = winner_id {
        game.winner_id = Some(winner_id);
        game.current_setter_id = None;
        game.phase = GamePhase::Won;
        log::info!("{} wins the game", game.player_name(winner_id));
        game.history.record(HistoryKind::RoundClosed {
            trick,
            next_setter_id: None,
            next_setter_name: None,
        });
        return;
    }

    let next = game
        .current_setter_id
        .and_then(|id| active_after(game, id).first().copied());
    game.current_setter_id = next;
    game.phase = GamePhase::RoundComplete;
    let next_setter_name = next.map(|id| game.player_name(id));
    log::debug!("Round on {:?} closed, next setter {:?}", trick, next_setter_name);
    game.history.record(HistoryKind::RoundClosed {
        trick,
        next_setter_id: next,
        next_setter_name,
    });
}

/// Active players other than `from`, in turn order starting right after `from` (wrapping).
fn active_after(game: &Game, from: PlayerId) -> Vec<PlayerId> {
    let len = game.turn_order.len();
    let Some(pos) = game.turn_order.iter().position(|id| *id == from) else {
        return Vec::new();
    };
    (1..len)
        .map(|offset| game.turn_order[(pos + offset) % len])
        .filter(|id| game.get_player(*id).is_some_and(|p| !p.eliminated))
        .collect()
}
