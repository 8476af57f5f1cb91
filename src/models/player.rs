//! Player and the letter ledger (S-K-A-T-E).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in turn order, rounds and history).
pub type PlayerId = Uuid;

/// Penalty letters in the order they are handed out.
pub const LETTERS: [char; 5] = ['S', 'K', 'A', 'T', 'E'];

/// Letters needed to spell the full word; reaching it eliminates the player.
pub const MAX_LETTERS: u8 = LETTERS.len() as u8;

/// A player in the game.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Letters collected so far, in [0, 5].
    pub letter_count: u8,
    /// Set exactly when `letter_count` reaches 5; never cleared within a game.
    pub eliminated: bool,
}

impl Player {
    /// Create a new player with the given name and a clean ledger.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            letter_count: 0,
            eliminated: false,
        }
    }

    /// Name to use when the display name is left blank: "Player N" with N 1-based.
    pub fn fallback_name(position: usize) -> String {
        format!("Player {}", position + 1)
    }

    /// Give the player one letter (clamped at 5). Returns true if this letter eliminated them.
    pub fn assign_letter(&mut self) -> bool {
        if self.letter_count >= MAX_LETTERS {
            return false;
        }
        self.letter_count += 1;
        if self.letter_count == MAX_LETTERS && !self.eliminated {
            self.eliminated = true;
            return true;
        }
        false
    }

    /// The letter handed out most recently, if any.
    pub fn last_letter(&self) -> Option<char> {
        match self.letter_count {
            0 => None,
            n => Some(LETTERS[usize::from(n.min(MAX_LETTERS)) - 1]),
        }
    }

    /// Letters spelled so far, e.g. "SK".
    pub fn letters(&self) -> String {
        LETTERS
            .iter()
            .take(usize::from(self.letter_count.min(MAX_LETTERS)))
            .collect()
    }

    /// No letters yet.
    pub fn is_clean(&self) -> bool {
        self.letter_count == 0
    }

    /// Back to zero letters, not eliminated (start of a fresh game with the same roster).
    pub fn reset_letters(&mut self) {
        self.letter_count = 0;
        self.eliminated = false;
    }
}
