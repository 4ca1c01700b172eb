/// High-score persistence.
///
/// The score lives under one well-known key in a small key-value layer.
/// Every failure of that layer is logged and swallowed: the in-memory best
/// keeps updating, it just is not durable.
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{info, warn};

use crate::error::StorageError;

pub const HIGHSCORE_KEY: &str = "space-groomers.highscore";

pub trait KeyValueStore {
    /// `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ── File-backed store ─────────────────────────────────────────────────────────

/// One file per key inside `dir`. The directory is created on first write.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform data dir>/space_groomers`, or the working directory when
    /// the platform has none.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("space_groomers")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

// ── In-memory and unavailable stores ──────────────────────────────────────────

/// Shared in-memory map; clones see the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Fallback when no storage can be used at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

// ── High score ────────────────────────────────────────────────────────────────

pub struct Highscores {
    store: Box<dyn KeyValueStore>,
    best: u32,
}

impl Highscores {
    /// Read the persisted best once. Missing, unreadable or corrupt values
    /// count as zero.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let best = match read_best(store.as_ref()) {
            Ok(best) => best,
            Err(e) => {
                warn!(error = %e, "could not read highscore; starting from 0");
                0
            }
        };
        Self { store, best }
    }

    /// Highscores that are never saved anywhere.
    pub fn volatile() -> Self {
        Self::load(Box::new(UnavailableStore))
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Fold a finished session's score in. Writes through only when the
    /// score beats the current best; returns whether it did.
    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        info!(score, "new highscore");
        if let Err(e) = self.store.set(HIGHSCORE_KEY, &score.to_string()) {
            warn!(error = %e, score, "could not save highscore");
        }
        true
    }
}

fn read_best(store: &dyn KeyValueStore) -> Result<u32, StorageError> {
    let Some(raw) = store.get(HIGHSCORE_KEY)? else {
        return Ok(0);
    };
    raw.trim().parse().map_err(|_| StorageError::Corrupt {
        key: HIGHSCORE_KEY.to_string(),
        value: raw,
    })
}
