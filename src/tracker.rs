//! Favorites, recently played games and per-game session bookkeeping.
//!
//! Every operation reads the stored value, changes it and writes it back
//! straight away, so nothing is cached between calls and a change made by
//! another tab is picked up on the next read. Stored values that fail to
//! decode are treated as empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::catalog::{Catalog, GameDescriptor};
use crate::config::PortalConfig;
use crate::error::StorageError;
use crate::storage::{KeyValueStore, read_json, read_json_or_default, write_json};

/// One entry of the recently-played log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub id: String,
    pub title: String,
    pub played_at: DateTime<Utc>,
    #[serde(rename = "src")]
    pub source_url: String,
}

impl RecentEntry {
    pub fn from_game(game: &GameDescriptor, played_at: DateTime<Utc>) -> Self {
        Self {
            id: game.id.clone(),
            title: game.title.clone(),
            played_at,
            source_url: game.source_url.clone(),
        }
    }
}

/// Written when the player leaves the focus page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub game_id: String,
    pub last_played: DateTime<Utc>,
    /// Milliseconds between page entry and leaving.
    pub session_duration: u64,
}

/// A `GAME_COMPLETE` payload stamped with the time it arrived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub completed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

type CompletionLog = BTreeMap<String, Vec<CompletionRecord>>;

pub struct Tracker<S> {
    store: S,
    config: PortalConfig,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(store: S, config: &PortalConfig) -> Self {
        Self {
            store,
            config: config.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Favorites -------------------------------------------------------

    pub fn favorites(&self) -> Vec<String> {
        read_json_or_default(&self.store, &self.config.favorites_key)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites().iter().any(|f| f == id)
    }

    /// Flips membership of `id` and persists the list. Returns whether the
    /// game is a favorite afterwards.
    pub fn toggle_favorite(&self, id: &str) -> Result<bool, StorageError> {
        let mut favorites = self.favorites();
        let now_favorite = match favorites.iter().position(|f| f == id) {
            Some(idx) => {
                favorites.remove(idx);
                false
            }
            None => {
                favorites.push(id.to_string());
                true
            }
        };
        write_json(&self.store, &self.config.favorites_key, &favorites)?;
        debug!(id, favorite = now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    /// Favorites resolved against `catalog`, in the order they were added.
    pub fn favorite_games<'c>(&self, catalog: &'c Catalog) -> Vec<&'c GameDescriptor> {
        let ids = self.favorites();
        catalog.resolve(ids.iter().map(String::as_str))
    }

    // --- Recently played -------------------------------------------------

    /// Most-recent-first. Entries that do not decode are skipped rather than
    /// discarding the whole log.
    pub fn recently_played(&self) -> Vec<RecentEntry> {
        let raw: Vec<Value> = read_json_or_default(&self.store, &self.config.recent_key);
        raw.into_iter()
            .filter_map(|v| match serde_json::from_value(v) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping malformed recent entry");
                    None
                }
            })
            .collect()
    }

    /// Moves (or inserts) `entry` to the front of the log and truncates it to
    /// capacity.
    pub fn record_played(&self, entry: RecentEntry) -> Result<Vec<RecentEntry>, StorageError> {
        let mut recent = self.recently_played();
        recent.retain(|e| e.id != entry.id);
        recent.insert(0, entry);
        recent.truncate(self.config.recent_capacity);
        write_json(&self.store, &self.config.recent_key, &recent)?;
        Ok(recent)
    }

    /// Recently played games still present in `catalog`, most recent first.
    pub fn recently_played_games<'c>(&self, catalog: &'c Catalog) -> Vec<&'c GameDescriptor> {
        let recent = self.recently_played();
        catalog.resolve(recent.iter().map(|e| e.id.as_str()))
    }

    // --- Sessions and completions ----------------------------------------

    pub fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        write_json(
            &self.store,
            &self.config.session_key(&record.game_id),
            record,
        )
    }

    pub fn session(&self, game_id: &str) -> Option<SessionRecord> {
        read_json(&self.store, &self.config.session_key(game_id))
    }

    pub fn record_completion(
        &self,
        game_id: &str,
        data: Map<String, Value>,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut log: CompletionLog = read_json_or_default(&self.store, &self.config.completions_key);
        log.entry(game_id.to_string())
            .or_default()
            .push(CompletionRecord { completed_at, data });
        write_json(&self.store, &self.config.completions_key, &log)
    }

    pub fn completions(&self, game_id: &str) -> Vec<CompletionRecord> {
        let mut log: CompletionLog = read_json_or_default(&self.store, &self.config.completions_key);
        log.remove(game_id).unwrap_or_default()
    }
}
