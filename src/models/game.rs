//! Game (the full snapshot), GamePhase and GameError.

use crate::models::history::{History, HistoryKind};
use crate::models::player::{Player, PlayerId, MAX_LETTERS};
use crate::models::round::{Round, RoundMode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Errors that can occur when applying a command. The game is left unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GameError {
    /// Starting needs at least 2 players.
    InvalidRosterSize { players: usize },
    /// Command not legal in the current phase.
    InvalidPhaseTransition { phase: GamePhase },
    /// A round is already being played.
    RoundAlreadyOpen,
    /// Only one player is left; no more rounds.
    GameAlreadyWon,
    /// No player with this id in the roster.
    PlayerNotFound(PlayerId),
    /// Trick text was blank.
    EmptyTrick,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidRosterSize { players } => {
                write!(f, "Need at least 2 players to start (have {})", players)
            }
            GameError::InvalidPhaseTransition { phase } => {
                write!(f, "Not allowed while the game is in phase {:?}", phase)
            }
            GameError::RoundAlreadyOpen => write!(f, "A round is already open"),
            GameError::GameAlreadyWon => write!(f, "The game already has a winner"),
            GameError::PlayerNotFound(_) => write!(f, "Player not found"),
            GameError::EmptyTrick => write!(f, "Trick name must not be empty"),
        }
    }
}

impl std::error::Error for GameError {}

/// Structural defects that make a stored snapshot unusable.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("duplicate player id {0}")]
    DuplicatePlayer(PlayerId),
    #[error("player {id} has {count} letters")]
    LetterCountOutOfRange { id: PlayerId, count: u8 },
    #[error("player {0} elimination flag does not match letters")]
    EliminationMismatch(PlayerId),
    #[error("turn order is not a permutation of the roster")]
    TurnOrderMismatch,
    #[error("unknown player id {0}")]
    UnknownPlayer(PlayerId),
    #[error("phase {0:?} is inconsistent with the rest of the snapshot")]
    PhaseMismatch(GamePhase),
    #[error("defender index {index} out of range for {len} defenders")]
    DefenderIndexOutOfRange { index: usize, len: usize },
    #[error("defender queue repeats a player or includes the setter")]
    InvalidDefenderQueue,
    #[error("setter {0} is eliminated")]
    EliminatedSetter(PlayerId),
    #[error("round setter does not match the current setter")]
    SetterMismatch,
    #[error("winner is not the last player standing")]
    WinnerMismatch,
    #[error("history event {index} has sequence number {seq}")]
    HistoryOutOfSequence { index: usize, seq: u64 },
}

/// Unique identifier for a game.
pub type GameId = Uuid;

/// Where the game is. One enum instead of scattered flags.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Roster editable; not started.
    #[default]
    Setup,
    /// Roster frozen and turn order shuffled; first setter not drawn yet.
    Order,
    /// First setter drawn; waiting for the first trick.
    Starting,
    /// Round open; the setter must try the trick.
    AwaitingSetterAttempt,
    /// Setter landed it; defenders answer in queue order.
    AwaitingDefenders,
    /// Round closed; the next setter may open a round.
    RoundComplete,
    /// One player left standing.
    Won,
}

impl GamePhase {
    /// Phases with a round in progress.
    pub fn round_open(self) -> bool {
        matches!(self, GamePhase::AwaitingSetterAttempt | GamePhase::AwaitingDefenders)
    }

    /// Roster composition is frozen (the game has started).
    pub fn started(self) -> bool {
        self != GamePhase::Setup
    }
}

/// Who sets first, emitted once at game start. The UI may stage it as a reveal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetterReveal {
    pub setter_id: PlayerId,
    pub setter_name: String,
    /// Player names in turn order.
    pub turn_order_names: Vec<String>,
}

/// Full game state. Serializable and round-trip safe: this is the snapshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub phase: GamePhase,
    pub mode: RoundMode,
    /// Roster in creation order.
    pub players: Vec<Player>,
    /// Fixed for the whole game once built; empty during setup.
    pub turn_order: Vec<PlayerId>,
    pub current_setter_id: Option<PlayerId>,
    /// Open round, or the last closed one.
    pub round: Option<Round>,
    pub winner_id: Option<PlayerId>,
    pub reveal: Option<SetterReveal>,
    pub history: History,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create a new game in Setup with no players.
    pub fn new() -> Self {
        Self::with_mode(RoundMode::default())
    }

    pub fn with_mode(mode: RoundMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: GamePhase::Setup,
            mode,
            players: Vec::new(),
            turn_order: Vec::new(),
            current_setter_id: None,
            round: None,
            winner_id: None,
            reveal: None,
            history: History::new(),
        }
    }

    /// Create a game in Setup with the given players.
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players,
            ..Self::new()
        }
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Display name for an id, empty if unknown.
    pub fn player_name(&self, id: PlayerId) -> String {
        self.get_player(id).map(|p| p.name.clone()).unwrap_or_default()
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner_id.and_then(|id| self.get_player(id))
    }

    /// Add a player (Setup only). A blank name is silently ignored.
    pub fn add_player(&mut self, name: &str) -> Result<Option<PlayerId>, GameError> {
        if self.phase.started() {
            return Err(GameError::InvalidPhaseTransition { phase: self.phase });
        }
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let player = Player::new(name);
        let id = player.id;
        self.players.push(player);
        Ok(Some(id))
    }

    /// Remove a player by id (Setup only).
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        if self.phase.started() {
            return Err(GameError::InvalidPhaseTransition { phase: self.phase });
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        self.players.remove(idx);
        Ok(())
    }

    /// Commit a display name. Blank falls back to "Player N" by current roster position.
    pub fn rename_player(&mut self, player_id: PlayerId, name: &str) -> Result<(), GameError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        let name = name.trim();
        self.players[idx].name = if name.is_empty() {
            Player::fallback_name(idx)
        } else {
            name.to_string()
        };
        Ok(())
    }

    /// Choose between full rounds and the setter-only configuration (Setup only).
    pub fn set_mode(&mut self, mode: RoundMode) -> Result<(), GameError> {
        if self.phase.started() {
            return Err(GameError::InvalidPhaseTransition { phase: self.phase });
        }
        self.mode = mode;
        Ok(())
    }

    /// Same trick (case-insensitive) was already opened in this game. Warning only.
    ///
    /// Every opened round leaves a set attempt in the history except the one still waiting
    /// for its setter, which is checked through `round`.
    pub fn trick_already_used(&self, trick: &str) -> bool {
        let trick = trick.trim();
        if trick.is_empty() {
            return false;
        }
        let awaiting = self.phase == GamePhase::AwaitingSetterAttempt
            && self
                .round
                .as_ref()
                .is_some_and(|r| r.trick.eq_ignore_ascii_case(trick));
        awaiting
            || self.history.events().iter().any(|e| match &e.kind {
                HistoryKind::SetAttempt { trick: used, .. } => used.eq_ignore_ascii_case(trick),
                _ => false,
            })
    }

    /// Back to Setup with the same roster: letters cleared, no turn order, no history.
    pub fn reset_keep_players(&mut self) {
        for p in &mut self.players {
            p.reset_letters();
        }
        self.phase = GamePhase::Setup;
        self.turn_order.clear();
        self.current_setter_id = None;
        self.round = None;
        self.winner_id = None;
        self.reveal = None;
        self.history = History::new();
    }

    /// Clear everything (roster and rules included). The game keeps its id.
    pub fn clear(&mut self) {
        let id = self.id;
        *self = Self::new();
        self.id = id;
    }

    /// Structural checks for a snapshot coming from storage.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut ids = HashSet::new();
        for p in &self.players {
            if !ids.insert(p.id) {
                return Err(SnapshotError::DuplicatePlayer(p.id));
            }
            if p.letter_count > MAX_LETTERS {
                return Err(SnapshotError::LetterCountOutOfRange {
                    id: p.id,
                    count: p.letter_count,
                });
            }
            if p.eliminated != (p.letter_count == MAX_LETTERS) {
                return Err(SnapshotError::EliminationMismatch(p.id));
            }
        }

        if let Some((index, seq)) = self.history.first_out_of_sequence() {
            return Err(SnapshotError::HistoryOutOfSequence { index, seq });
        }

        let known = |id: &PlayerId| -> Result<(), SnapshotError> {
            if ids.contains(id) {
                Ok(())
            } else {
                Err(SnapshotError::UnknownPlayer(*id))
            }
        };

        if self.phase == GamePhase::Setup {
            if !self.turn_order.is_empty() || self.round.is_some() || self.winner_id.is_some() {
                return Err(SnapshotError::PhaseMismatch(self.phase));
            }
            return Ok(());
        }

        let order: HashSet<PlayerId> = self.turn_order.iter().copied().collect();
        if order.len() != self.turn_order.len() || order != ids || ids.len() < 2 {
            return Err(SnapshotError::TurnOrderMismatch);
        }
        if let Some(id) = &self.current_setter_id {
            known(id)?;
        }
        if let Some(id) = &self.winner_id {
            known(id)?;
        }
        if let Some(round) = &self.round {
            known(&round.setter_id)?;
            let mut queued = HashSet::new();
            for id in &round.defender_queue {
                known(id)?;
                if *id == round.setter_id || !queued.insert(*id) {
                    return Err(SnapshotError::InvalidDefenderQueue);
                }
            }
            if round.current_defender_index > round.defender_queue.len() {
                return Err(SnapshotError::DefenderIndexOutOfRange {
                    index: round.current_defender_index,
                    len: round.defender_queue.len(),
                });
            }
        }

        let active: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| !p.eliminated)
            .map(|p| p.id)
            .collect();
        let consistent = match self.phase {
            GamePhase::Setup => true,
            GamePhase::Order => self.current_setter_id.is_none() && self.round.is_none(),
            GamePhase::Starting | GamePhase::RoundComplete => {
                self.current_setter_id.is_some() && self.winner_id.is_none() && active.len() >= 2
            }
            GamePhase::AwaitingSetterAttempt => {
                self.round.as_ref().is_some_and(|r| r.current_defender_index == 0)
                    && self.winner_id.is_none()
            }
            GamePhase::AwaitingDefenders => {
                self.round
                    .as_ref()
                    .is_some_and(|r| r.current_defender().is_some())
                    && self.winner_id.is_none()
            }
            GamePhase::Won => self.winner_id.is_some() && active.len() == 1,
        };
        if !consistent {
            return Err(SnapshotError::PhaseMismatch(self.phase));
        }

        if self.phase == GamePhase::Won {
            if self.winner_id != active.first().copied() {
                return Err(SnapshotError::WinnerMismatch);
            }
            return Ok(());
        }
        if self.phase.round_open() {
            let round_setter = self.round.as_ref().map(|r| r.setter_id);
            if round_setter != self.current_setter_id {
                return Err(SnapshotError::SetterMismatch);
            }
        }
        if let Some(id) = self.current_setter_id {
            if !active.contains(&id) {
                return Err(SnapshotError::EliminatedSetter(id));
            }
        }
        Ok(())
    }
}
