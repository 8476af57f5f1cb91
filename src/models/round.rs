//! Round (one trick set by a setter, answered by the defenders) and RoundMode.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// How a round is played once the setter lands the trick.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    /// Every other active player must answer a landed trick.
    #[default]
    SetterAndDefenders,
    /// Reduced configuration: no defender phase, a landed trick closes the round.
    SetterOnly,
}

/// The current (or most recently closed) round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Free text, display only.
    pub trick: String,
    pub setter_id: PlayerId,
    /// Active players other than the setter, in turn order starting after the setter.
    /// Captured when the round opens and never re-filtered.
    pub defender_queue: Vec<PlayerId>,
    /// Next defender to attempt; equals `defender_queue.len()` once everyone answered.
    pub current_defender_index: usize,
}

impl Round {
    pub fn new(trick: impl Into<String>, setter_id: PlayerId, defender_queue: Vec<PlayerId>) -> Self {
        Self {
            trick: trick.into(),
            setter_id,
            defender_queue,
            current_defender_index: 0,
        }
    }

    /// Defender whose attempt is pending, if any.
    pub fn current_defender(&self) -> Option<PlayerId> {
        self.defender_queue.get(self.current_defender_index).copied()
    }

    /// Move to the next defender. Returns true when the queue is exhausted.
    pub fn advance_defender(&mut self) -> bool {
        if self.current_defender_index < self.defender_queue.len() {
            self.current_defender_index += 1;
        }
        self.current_defender_index >= self.defender_queue.len()
    }
}
