//! Engine: owns one game, its RNG and a snapshot store.
//!
//! Commands are applied one at a time. Each accepted command saves the new snapshot;
//! a failed save is logged and the in-memory game stays the source of truth. A rejected
//! command leaves the game unchanged and saves nothing.

use crate::logic;
use crate::models::{Game, GameError, PlayerId, RoundMode, SetterReveal};
use crate::persistence::{load_valid, SnapshotStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct Engine<S> {
    game: Game,
    rng: ChaCha8Rng,
    store: S,
}

impl<S: SnapshotStore> Engine<S> {
    /// Fresh game in Setup, RNG seeded from entropy.
    pub fn new(store: S) -> Self {
        Self::from_parts(Game::new(), ChaCha8Rng::from_entropy(), store)
    }

    /// Fresh game with a deterministic RNG.
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self::from_parts(Game::new(), ChaCha8Rng::seed_from_u64(seed), store)
    }

    /// Continue from an existing game value (not saved until the next command).
    pub fn from_game(game: Game, store: S) -> Self {
        Self::from_parts(game, ChaCha8Rng::from_entropy(), store)
    }

    fn from_parts(game: Game, rng: ChaCha8Rng, store: S) -> Self {
        Self { game, rng, store }
    }

    /// The stored game, or `None` when nothing valid is stored.
    pub fn resume(store: S) -> Option<Self> {
        let game = load_valid(&store)?;
        log::info!("Resumed game {} in phase {:?}", game.id, game.phase);
        Some(Self::from_game(game, store))
    }

    /// The stored game, falling back to a fresh Setup game.
    pub fn restore(store: S) -> Self {
        match load_valid(&store) {
            Some(game) => Self::from_game(game, store),
            None => Self::new(store),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &Game {
        &self.game
    }

    /// Add a player during setup. Blank names are ignored (`Ok(None)`).
    pub fn add_player(&mut self, name: &str) -> Result<Option<PlayerId>, GameError> {
        let id = self.game.add_player(name)?;
        if id.is_some() {
            self.persist();
        }
        Ok(id)
    }

    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.apply(|game| game.remove_player(player_id))
    }

    pub fn rename_player(&mut self, player_id: PlayerId, name: &str) -> Result<(), GameError> {
        self.apply(|game| game.rename_player(player_id, name))
    }

    pub fn set_round_mode(&mut self, mode: RoundMode) -> Result<(), GameError> {
        self.apply(|game| game.set_mode(mode))
    }

    /// Freeze the roster, shuffle the turn order and draw the first setter.
    pub fn start_game(&mut self) -> Result<SetterReveal, GameError> {
        // Work on a copy: the two steps must land together or not at all.
        let mut next = self.game.clone();
        let reveal = logic::start_game(&mut next, &mut self.rng)?;
        self.game = next;
        log::info!(
            "Game {} started with {} players, {} sets first",
            self.game.id,
            self.game.turn_order.len(),
            reveal.setter_name
        );
        self.persist();
        Ok(reveal)
    }

    pub fn open_round(&mut self, trick: &str) -> Result<(), GameError> {
        self.apply(|game| logic::open_round(game, trick))
    }

    pub fn record_setter_attempt(&mut self, landed: bool) -> Result<(), GameError> {
        self.apply(|game| logic::record_setter_attempt(game, landed))
    }

    pub fn record_defense_attempt(&mut self, landed: bool) -> Result<(), GameError> {
        self.apply(|game| logic::record_defense_attempt(game, landed))
    }

    /// Zero all letters and go back to Setup with the same roster.
    pub fn reset_round(&mut self) -> Result<(), GameError> {
        self.apply(|game| {
            game.reset_keep_players();
            Ok(())
        })
    }

    /// Clear the roster and every other piece of state.
    pub fn new_game(&mut self) -> Result<(), GameError> {
        self.apply(|game| {
            game.clear();
            Ok(())
        })
    }

    fn apply<T>(&mut self, f: impl FnOnce(&mut Game) -> Result<T, GameError>) -> Result<T, GameError> {
        let out = f(&mut self.game)?;
        log::debug!("Game {} now in phase {:?}", self.game.id, self.game.phase);
        self.persist();
        Ok(out)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.game) {
            log::warn!("Could not save game {}: {}", self.game.id, e);
        }
    }
}
