//! Favorites and recent history store
//!
//! `LibraryStore` keeps both collections in memory and writes each one
//! through to the key-value backend after every mutation. All operations take
//! the same async mutex for their whole read-modify-persist step, so two
//! concurrent mutations can never interleave their writes.
//!
//! Persistence failures never surface to callers: reads fall back to the
//! seed (favorites) or an empty list (recent), writes are logged and the
//! in-memory change stands.

use crate::catalog;
use crate::error::{LibraryError, Result};
use crate::models::{
    FavoritesView, LibraryStats, RecentEntry, Track, TrackId, DEFAULT_DURATION_MINUTES,
};
use crate::storage::{FAVORITES_KEY, RECENT_KEY};
use bridge_traits::{Clock, KeyValueStore};
use chrono::{DateTime, Utc};
use core_runtime::config::LibraryConfig;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Format version written into exports.
pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Default)]
struct LibraryState {
    loaded: bool,
    favorites: Vec<Track>,
    recent: Vec<RecentEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotExport<'a> {
    favorites: &'a [Track],
    recent: &'a [RecentEntry],
    exported_at: DateTime<Utc>,
    version: &'a str,
}

#[derive(Deserialize)]
struct SnapshotImport {
    #[serde(default)]
    favorites: Option<Vec<Track>>,
    #[serde(default)]
    recent: Option<Vec<RecentEntry>>,
}

/// Persisted favorites and recent history.
pub struct LibraryStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: LibraryConfig,
    event_bus: Option<EventBus>,
    state: Mutex<LibraryState>,
}

impl LibraryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: LibraryConfig) -> Self {
        Self {
            kv,
            clock,
            config,
            event_bus: None,
            state: Mutex::new(LibraryState::default()),
        }
    }

    /// Publishes library events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Loads both collections from storage.
    ///
    /// Idempotent; every other operation calls it implicitly. An empty
    /// favorites key is seeded with the popular set, which is persisted.
    pub async fn initialize(&self) {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
    }

    /// Appends `track` to favorites. Returns `false` if it was already there.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn add_favorite(&self, track: Track) -> bool {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        if state.favorites.iter().any(|fav| fav.id == track.id) {
            return false;
        }

        let event = LibraryEvent::FavoriteAdded {
            track_id: track.id.0,
            name: track.name.clone(),
        };
        state.favorites.push(track);
        self.persist_favorites(&state.favorites).await;
        drop(state);

        self.emit(event);
        true
    }

    /// Removes the favorite with `id`. Returns `false` if it was absent.
    #[instrument(skip(self))]
    pub async fn remove_favorite(&self, id: TrackId) -> bool {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        let Some(index) = state.favorites.iter().position(|fav| fav.id == id) else {
            return false;
        };

        state.favorites.remove(index);
        self.persist_favorites(&state.favorites).await;
        drop(state);

        self.emit(LibraryEvent::FavoriteRemoved { track_id: id.0 });
        true
    }

    /// Adds `track` if absent, removes it otherwise. Returns the new state.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn toggle_favorite(&self, track: Track) -> bool {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        let (now_favorite, event) = match state.favorites.iter().position(|fav| fav.id == track.id) {
            Some(index) => {
                state.favorites.remove(index);
                (false, LibraryEvent::FavoriteRemoved { track_id: track.id.0 })
            }
            None => {
                let event = LibraryEvent::FavoriteAdded {
                    track_id: track.id.0,
                    name: track.name.clone(),
                };
                state.favorites.push(track);
                (true, event)
            }
        };
        self.persist_favorites(&state.favorites).await;
        drop(state);

        self.emit(event);
        now_favorite
    }

    pub async fn is_favorite(&self, id: TrackId) -> bool {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        state.favorites.iter().any(|fav| fav.id == id)
    }

    pub async fn list_favorites(&self) -> FavoritesView {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        FavoritesView::from_favorites(&state.favorites)
    }

    /// Moves `track` to the front of the recent history, stamped with the
    /// current time, and trims the history to its capacity.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn record_play(&self, track: Track) {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        let played_at = self.clock.now();
        let track_id = track.id;

        state.recent.retain(|entry| entry.track.id != track_id);
        state.recent.insert(0, RecentEntry { track, played_at });
        state.recent.truncate(self.config.recent_capacity);
        self.persist_recent(&state.recent).await;
        drop(state);

        self.emit(LibraryEvent::RecentRecorded {
            track_id: track_id.0,
            played_at,
        });
    }

    /// Recent history, most recent first.
    pub async fn list_recent(&self) -> Vec<RecentEntry> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        state.recent.clone()
    }

    pub async fn clear_recent(&self) {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        state.recent.clear();
        self.persist_recent(&state.recent).await;
        drop(state);

        self.emit(LibraryEvent::RecentCleared);
    }

    pub async fn stats(&self) -> LibraryStats {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        // Tally in first-seen order so ties resolve to the most recent category.
        let mut tally: Vec<(&str, usize)> = Vec::new();
        for entry in &state.recent {
            let category = entry.track.category_or_unknown();
            match tally.iter_mut().find(|(name, _)| *name == category) {
                Some((_, count)) => *count += 1,
                None => tally.push((category, 1)),
            }
        }
        let most_played_category = tally
            .iter()
            .fold(None::<(&str, usize)>, |best, &(name, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((name, count)),
            })
            .map(|(name, _)| name.to_string());

        LibraryStats {
            total_catalog_size: catalog::catalog_size(),
            favorites_count: state.favorites.len(),
            recent_count: state.recent.len(),
            most_played_category,
            total_play_time_minutes_estimate: state
                .recent
                .iter()
                .map(|entry| match entry.track.duration_minutes {
                    0 => u64::from(DEFAULT_DURATION_MINUTES),
                    minutes => u64::from(minutes),
                })
                .sum(),
            last_played_at: state.recent.first().map(|entry| entry.played_at),
        }
    }

    /// Pretty-printed JSON document holding both collections.
    pub async fn export_snapshot(&self) -> String {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        let export = SnapshotExport {
            favorites: &state.favorites,
            recent: &state.recent,
            exported_at: self.clock.now(),
            version: SNAPSHOT_VERSION,
        };

        match serde_json::to_string_pretty(&export) {
            Ok(json) => json,
            Err(e) => {
                // Tracks and timestamps always serialize; keep the signature infallible.
                warn!(error = %e, "Failed to serialize library snapshot");
                String::from("{}")
            }
        }
    }

    /// Replaces the collections present in `json`.
    ///
    /// The whole document is validated before anything is applied. Returns
    /// `false` and leaves both collections untouched when the JSON is
    /// malformed, a present section is not a list of well-formed entries, or
    /// neither section is present.
    #[instrument(skip(self, json))]
    pub async fn import_snapshot(&self, json: &str) -> bool {
        let import = match parse_snapshot(json) {
            Ok(import) => import,
            Err(e) => {
                warn!(error = %e, "Rejected library snapshot");
                return false;
            }
        };

        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        let mut favorites_count = None;
        let mut recent_count = None;

        if let Some(favorites) = import.favorites {
            state.favorites = dedup_by_id(favorites, |track| track.id);
            favorites_count = Some(state.favorites.len());
            self.persist_favorites(&state.favorites).await;
        }

        if let Some(recent) = import.recent {
            let mut recent = dedup_by_id(recent, |entry| entry.track.id);
            recent.truncate(self.config.recent_capacity);
            state.recent = recent;
            recent_count = Some(state.recent.len());
            self.persist_recent(&state.recent).await;
        }
        drop(state);

        info!(?favorites_count, ?recent_count, "Imported library snapshot");
        self.emit(LibraryEvent::SnapshotImported {
            favorites: favorites_count,
            recent: recent_count,
        });
        true
    }

    /// Catalog search; see [`catalog::search`].
    pub fn search(&self, query: &str) -> Vec<Track> {
        catalog::search(query)
    }

    async fn ensure_loaded(&self, state: &mut LibraryState) {
        if state.loaded {
            return;
        }

        state.favorites = self.load_favorites().await;
        state.recent = self.load_recent().await;
        state.loaded = true;
        debug!(
            favorites = state.favorites.len(),
            recent = state.recent.len(),
            "Library loaded"
        );
    }

    async fn load_favorites(&self) -> Vec<Track> {
        match self.read_list::<Track>(FAVORITES_KEY).await {
            Ok(Some(favorites)) => favorites,
            Ok(None) => {
                let seed = self.seed_favorites();
                if !seed.is_empty() {
                    self.persist_favorites(&seed).await;
                }
                seed
            }
            Err(e) => {
                warn!(error = %e, "Failed to load favorites, using seed");
                self.seed_favorites()
            }
        }
    }

    async fn load_recent(&self) -> Vec<RecentEntry> {
        match self.read_list::<RecentEntry>(RECENT_KEY).await {
            Ok(recent) => recent.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to load recent history");
                Vec::new()
            }
        }
    }

    fn seed_favorites(&self) -> Vec<Track> {
        if self.config.seed_popular_favorites {
            catalog::popular_tracks()
        } else {
            Vec::new()
        }
    }

    /// Reads a persisted list, skipping entries that no longer decode.
    ///
    /// Only a document that is not a JSON array counts as an error.
    async fn read_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let Some(json) = self.kv.get(key).await? else {
            return Ok(None);
        };
        let raw: Vec<serde_json::Value> = serde_json::from_str(&json)?;
        let total = raw.len();
        let items: Vec<T> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!(key, error = %e, "Skipping undecodable entry");
                    None
                }
            })
            .collect();
        if items.len() < total {
            warn!(key, skipped = total - items.len(), "Dropped unreadable stored entries");
        }
        Ok(Some(items))
    }

    async fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.kv.set(key, &json).await?;
        Ok(())
    }

    async fn persist_favorites(&self, favorites: &[Track]) {
        if let Err(e) = self.write_list(FAVORITES_KEY, favorites).await {
            warn!(error = %e, "Failed to save favorites");
        }
    }

    async fn persist_recent(&self, recent: &[RecentEntry]) {
        if let Err(e) = self.write_list(RECENT_KEY, recent).await {
            warn!(error = %e, "Failed to save recent history");
        }
    }

    fn emit(&self, event: LibraryEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine.
            let _ = bus.emit(CoreEvent::Library(event));
        }
    }
}

fn parse_snapshot(json: &str) -> Result<SnapshotImport> {
    let import: SnapshotImport = serde_json::from_str(json)?;
    if import.favorites.is_none() && import.recent.is_none() {
        return Err(LibraryError::InvalidInput {
            field: "snapshot".to_string(),
            message: "neither favorites nor recent present".to_string(),
        });
    }
    Ok(import)
}

fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> TrackId) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(id(item))).collect()
}
