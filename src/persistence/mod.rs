//! Save/load persistence
//!
//! Features:
//! - Camel-case JSON save record (`totalGems`, `areasCompleted`, ...)
//! - Pluggable string storage (`MemoryStore` natively, LocalStorage on wasm)
//! - Missing or corrupt data degrades to defaults with a warning

pub mod store;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::consts::{GEM_ITEM, START_MAP};
use crate::sim::inventory::{Inventory, InventorySnapshot};

#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
pub use store::{MemoryStore, SaveStore};

/// Storage key for the progress record
pub const SAVE_KEY: &str = "cloud_kingdom_save";
/// Storage key for [`crate::Settings`]
pub const SETTINGS_KEY: &str = "cloud_kingdom_settings";
/// Storage key for [`crate::HighScores`]
pub const HIGHSCORES_KEY: &str = "cloud_kingdom_highscores";

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("corrupt data under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode a JSON value. `Ok(None)` when nothing is stored.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, PersistenceError>
where
    T: DeserializeOwned,
    S: SaveStore + ?Sized,
{
    let Some(json) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| PersistenceError::Corrupt {
            key: key.to_string(),
            source,
        })
}

pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), PersistenceError>
where
    T: Serialize,
    S: SaveStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| PersistenceError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.write(key, &json)
}

/// Progress carried between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveData {
    /// Gems held at the last area completion
    pub total_gems: u32,
    pub quests_completed: usize,
    /// Area ids in completion order, each at most once
    pub areas_completed: Vec<String>,
    /// Area to resume in
    pub current_map: String,
    pub inventory: InventorySnapshot,
    /// Set once the last area is cleared; a finished game resumes finished
    pub finished: bool,
}

impl Default for SaveData {
    fn default() -> Self {
        Self::new(START_MAP)
    }
}

impl SaveData {
    pub fn new(current_map: &str) -> Self {
        Self {
            total_gems: 0,
            quests_completed: 0,
            areas_completed: Vec::new(),
            current_map: current_map.to_string(),
            inventory: InventorySnapshot::default(),
            finished: false,
        }
    }

    pub fn has_completed(&self, map_id: &str) -> bool {
        self.areas_completed.iter().any(|id| id == map_id)
    }

    /// Record a cleared area. Replaying an already cleared area refreshes
    /// the inventory but adds no quests.
    pub fn record_area(&mut self, map_id: &str, quests_completed: usize, inventory: &Inventory) {
        if !self.has_completed(map_id) {
            self.areas_completed.push(map_id.to_string());
            self.quests_completed += quests_completed;
        }
        self.total_gems = inventory.get_count(GEM_ITEM);
        self.inventory = inventory.snapshot();
    }

    /// Stored progress, or a fresh record when missing or unreadable
    pub fn load<S: SaveStore + ?Sized>(store: &S) -> Self {
        match load_json(store, SAVE_KEY) {
            Ok(Some(save)) => {
                log::info!("Loaded save data");
                save
            }
            Ok(None) => {
                log::info!("No save data found, starting fresh");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring save data: {}", err);
                Self::default()
            }
        }
    }

    /// Whether a save exists to continue from
    pub fn exists<S: SaveStore + ?Sized>(store: &S) -> bool {
        matches!(store.read(SAVE_KEY), Ok(Some(_)))
    }

    pub fn save<S: SaveStore + ?Sized>(&self, store: &S) {
        match save_json(store, SAVE_KEY, self) {
            Ok(()) => log::info!(
                "Progress saved ({} areas, {} gems)",
                self.areas_completed.len(),
                self.total_gems
            ),
            Err(err) => log::warn!("Failed to save progress: {}", err),
        }
    }

    pub fn clear<S: SaveStore + ?Sized>(store: &S) {
        if let Err(err) = store.remove(SAVE_KEY) {
            log::warn!("Failed to clear save data: {}", err);
        }
    }
}
