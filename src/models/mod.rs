//! Data structures for the S.K.A.T.E. game: players, rounds, history, game snapshot.

mod game;
mod history;
mod player;
mod round;

pub use game::{Game, GameError, GameId, GamePhase, SetterReveal, SnapshotError};
pub use history::{History, HistoryEvent, HistoryKind};
pub use player::{Player, PlayerId, LETTERS, MAX_LETTERS};
pub use round::{Round, RoundMode};
