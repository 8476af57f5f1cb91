//! Elimination and winner detection, plus the risk chart.

use crate::models::Player;

/// Who is still in, and the winner if exactly one is left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standings<'a> {
    /// At least one player is out.
    pub eliminated: bool,
    pub remaining: Vec<&'a Player>,
    pub winner: Option<&'a Player>,
}

/// Recomputed from the player list every time; never cached.
///
/// A winner needs a roster of at least 2 and exactly one player not eliminated.
pub fn standings(players: &[Player]) -> Standings<'_> {
    let remaining: Vec<&Player> = players.iter().filter(|p| !p.eliminated).collect();
    let winner = if players.len() >= 2 && remaining.len() == 1 {
        Some(remaining[0])
    } else {
        None
    };
    Standings {
        eliminated: remaining.len() < players.len(),
        remaining,
        winner,
    }
}

/// Active players sorted by letters (most first), then name.
pub fn risk_ranking(players: &[Player]) -> Vec<&Player> {
    let mut ranked: Vec<&Player> = players.iter().filter(|p| !p.eliminated).collect();
    ranked.sort_by(|a, b| {
        b.letter_count
            .cmp(&a.letter_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}

/// Active players holding the highest letter count (none while everyone is clean).
pub fn leaders(players: &[Player]) -> Vec<&Player> {
    let max = players
        .iter()
        .filter(|p| !p.eliminated)
        .map(|p| p.letter_count)
        .max()
        .unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }
    players
        .iter()
        .filter(|p| !p.eliminated && p.letter_count == max)
        .collect()
}
