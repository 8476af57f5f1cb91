//! S.K.A.T.E. game web app: library with models, game logic, the engine and snapshot storage.

pub mod engine;
pub mod logic;
pub mod models;
pub mod persistence;

pub use engine::Engine;
pub use logic::{
    build_turn_order, choose_first_setter, history_to_csv, leaders, open_round,
    record_defense_attempt, record_setter_attempt, risk_ranking, standings, start_game, Standings,
};
pub use models::{
    Game, GameError, GameId, GamePhase, History, HistoryEvent, HistoryKind, Player, PlayerId,
    Round, RoundMode, SetterReveal, SnapshotError, LETTERS, MAX_LETTERS,
};
pub use persistence::{load_valid, JsonFileStore, MemoryStore, SnapshotStore, StoreError};
