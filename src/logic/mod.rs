//! Game logic: setup, the round state machine, standings and history export.

mod export;
mod round;
mod setup;
mod standings;

pub use export::history_to_csv;
pub use round::{open_round, record_defense_attempt, record_setter_attempt};
pub use setup::{build_turn_order, choose_first_setter, start_game};
pub use standings::{leaders, risk_ranking, standings, Standings};
