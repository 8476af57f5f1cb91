//! Append-only history of what happened in a game (display and audit only).

use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryKind {
    /// The setter tried the trick.
    SetAttempt {
        player_id: PlayerId,
        player_name: String,
        trick: String,
        landed: bool,
    },
    /// A defender tried to answer the trick.
    DefenseAttempt {
        player_id: PlayerId,
        player_name: String,
        trick: String,
        landed: bool,
    },
    /// A failed attempt cost a letter.
    LetterAssigned {
        player_id: PlayerId,
        player_name: String,
        letter: char,
        letter_count: u8,
        eliminated: bool,
    },
    /// The round is over; names the resolved trick and who sets next (none once won).
    RoundClosed {
        trick: String,
        next_setter_id: Option<PlayerId>,
        next_setter_name: Option<String>,
    },
}

/// One entry of the timeline.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Position in the log, starting at 1.
    pub seq: u64,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: HistoryKind,
}

impl HistoryEvent {
    /// Short machine name of the event kind (as serialized).
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            HistoryKind::SetAttempt { .. } => "set_attempt",
            HistoryKind::DefenseAttempt { .. } => "defense_attempt",
            HistoryKind::LetterAssigned { .. } => "letter_assigned",
            HistoryKind::RoundClosed { .. } => "round_closed",
        }
    }

    /// One human-readable line for the timeline.
    pub fn describe(&self) -> String {
        match &self.kind {
            HistoryKind::SetAttempt { player_name, trick, landed, .. } => {
                format!("{} {} the {}", player_name, landed_word(*landed), trick)
            }
            HistoryKind::DefenseAttempt { player_name, trick, landed, .. } => {
                format!("{} {} the {} in defense", player_name, landed_word(*landed), trick)
            }
            HistoryKind::LetterAssigned { player_name, letter, eliminated: true, .. } => {
                format!("{} gets {} and is out", player_name, letter)
            }
            HistoryKind::LetterAssigned { player_name, letter, .. } => {
                format!("{} gets {}", player_name, letter)
            }
            HistoryKind::RoundClosed { trick, next_setter_name: Some(next), .. } => {
                format!("Round on {} closed, {} sets next", trick, next)
            }
            HistoryKind::RoundClosed { trick, .. } => format!("Round on {} closed, game over", trick),
        }
    }
}

fn landed_word(landed: bool) -> &'static str {
    if landed {
        "landed"
    } else {
        "missed"
    }
}

/// Append-only log. Entries are only ever pushed at the end.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    events: Vec<HistoryEvent>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped with the next sequence number and the current time.
    pub fn record(&mut self, kind: HistoryKind) {
        let seq = self.events.len() as u64 + 1;
        self.events.push(HistoryEvent {
            seq,
            at: Utc::now(),
            kind,
        });
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// First event whose `seq` is not its 1-based position, as `(index, seq)`.
    pub fn first_out_of_sequence(&self) -> Option<(usize, u64)> {
        self.events
            .iter()
            .enumerate()
            .find(|(i, e)| e.seq != *i as u64 + 1)
            .map(|(i, e)| (i, e.seq))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Human-readable timeline, oldest first.
    pub fn timeline(&self) -> Vec<String> {
        self.events.iter().map(HistoryEvent::describe).collect()
    }
}
