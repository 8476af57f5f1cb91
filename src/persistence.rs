//! Snapshot storage: save after every accepted command, load on startup.
//!
//! Saving is best-effort and loading treats anything unusable as "no saved game".

use crate::models::Game;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced by store implementations. Never shown to players.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock was poisoned")]
    LockPoisoned,
}

/// Where snapshots go.
pub trait SnapshotStore {
    /// Persist the full snapshot, replacing the previous one.
    fn save(&self, game: &Game) -> Result<(), StoreError>;

    /// The last saved snapshot, `None` if nothing was saved. Not validated.
    fn load(&self) -> Result<Option<Game>, StoreError>;
}

/// Load and validate. Read errors, parse errors and structural defects all mean "absent".
pub fn load_valid<S: SnapshotStore + ?Sized>(store: &S) -> Option<Game> {
    let game = match store.load() {
        Ok(game) => game?,
        Err(e) => {
            log::warn!("Discarding saved game: {}", e);
            return None;
        }
    };
    match game.validate() {
        Ok(()) => Some(game),
        Err(e) => {
            log::warn!("Discarding saved game {}: {}", game.id, e);
            None
        }
    }
}

/// One JSON file per game. Writes go to a temp file and are renamed into place.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{dir}/{game_id}.json`.
    pub fn for_game(dir: impl AsRef<Path>, game_id: crate::models::GameId) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", game_id)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, game: &Game) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(game)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;
        log::debug!("Saved game {} to {}", game.id, self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<Game>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let game = serde_json::from_slice(&bytes)?;
        Ok(Some(game))
    }
}

/// Keeps the serialized snapshot in memory (same JSON as the file store).
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw JSON, e.g. a hand-edited or corrupted snapshot.
    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            json: Mutex::new(Some(json.into())),
        }
    }

    /// Raw JSON of the last save.
    pub fn json(&self) -> Option<String> {
        self.json.lock().ok().and_then(|g| g.clone())
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, game: &Game) -> Result<(), StoreError> {
        let json = serde_json::to_string(game)?;
        *self.json.lock().map_err(|_| StoreError::LockPoisoned)? = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Option<Game>, StoreError> {
        let guard = self.json.lock().map_err(|_| StoreError::LockPoisoned)?;
        match guard.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn save(&self, game: &Game) -> Result<(), StoreError> {
        (**self).save(game)
    }

    fn load(&self) -> Result<Option<Game>, StoreError> {
        (**self).load()
    }
}
