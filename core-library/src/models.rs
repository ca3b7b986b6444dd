//! Domain models for the frequency library
//!
//! Tracks are immutable catalog data; favorites and recent history hold
//! copies of them. Serialization is camelCase so persisted documents and
//! exports stay readable by the mobile apps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Duration assumed for tracks that do not carry one.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Category name used in statistics for tracks without a category.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// =============================================================================
// ID Types
// =============================================================================

/// Catalog identifier of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl From<u32> for TrackId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A playable tone from the catalog.
///
/// Deserialization also accepts the older field names `frequency`,
/// `duration` and `image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    #[serde(alias = "frequency")]
    pub frequency_hz: f64,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "duration", default = "default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub category: String,
    #[serde(alias = "image", default)]
    pub icon: String,
    /// Part of the popular set seeded into favorites
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_recommended: bool,
}

fn default_duration_minutes() -> u32 {
    DEFAULT_DURATION_MINUTES
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Track {
    /// Category name for aggregation, substituting `"Unknown"` when empty.
    pub fn category_or_unknown(&self) -> &str {
        if self.category.is_empty() {
            UNKNOWN_CATEGORY
        } else {
            &self.category
        }
    }
}

/// One entry of the recent history.
///
/// Stored flattened, i.e. the track fields plus `playedAt` in one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRecentEntry")]
pub struct RecentEntry {
    #[serde(flatten)]
    pub track: Track,
    pub played_at: DateTime<Utc>,
}

// Flat mirror of `RecentEntry` for reading; field aliases are not honored
// through `#[serde(flatten)]`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecentEntry {
    id: TrackId,
    name: String,
    #[serde(alias = "frequency")]
    frequency_hz: f64,
    #[serde(default)]
    description: String,
    #[serde(alias = "duration", default = "default_duration_minutes")]
    duration_minutes: u32,
    #[serde(default)]
    category: String,
    #[serde(alias = "image", default)]
    icon: String,
    #[serde(default)]
    is_recommended: bool,
    played_at: DateTime<Utc>,
}

impl From<StoredRecentEntry> for RecentEntry {
    fn from(stored: StoredRecentEntry) -> Self {
        Self {
            track: Track {
                id: stored.id,
                name: stored.name,
                frequency_hz: stored.frequency_hz,
                description: stored.description,
                duration_minutes: stored.duration_minutes,
                category: stored.category,
                icon: stored.icon,
                is_recommended: stored.is_recommended,
            },
            played_at: stored.played_at,
        }
    }
}

/// Favorites split the way the favorites screen shows them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesView {
    /// Favorites flagged `isRecommended`, in collection order
    pub recommended: Vec<Track>,
    /// Everything else, in collection order
    pub user_favorites: Vec<Track>,
    /// The whole collection
    pub all: Vec<Track>,
}

impl FavoritesView {
    pub fn from_favorites(favorites: &[Track]) -> Self {
        let (recommended, user_favorites) = favorites
            .iter()
            .cloned()
            .partition(|track| track.is_recommended);

        Self {
            recommended,
            user_favorites,
            all: favorites.to_vec(),
        }
    }
}

/// Aggregates derived from the catalog, favorites, and recent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total_catalog_size: usize,
    pub favorites_count: usize,
    pub recent_count: usize,
    /// Category appearing most often in the recent history; ties resolve to
    /// the category seen first (most recent)
    pub most_played_category: Option<String>,
    /// Sum of the nominal durations of the recent entries
    pub total_play_time_minutes_estimate: u64,
    pub last_played_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_serializes_camel_case() {
        let track = Track {
            id: TrackId(528),
            name: "Love Frequency".to_string(),
            frequency_hz: 528.0,
            description: "DNA repair miracle tone".to_string(),
            duration_minutes: 30,
            category: "Chill Vibes Only".to_string(),
            icon: "💚".to_string(),
            is_recommended: true,
        };

        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["id"], 528);
        assert_eq!(json["frequencyHz"], 528.0);
        assert_eq!(json["durationMinutes"], 30);
        assert_eq!(json["isRecommended"], true);
    }

    #[test]
    fn test_track_accepts_legacy_field_names() {
        let json = r#"{"id":7,"name":"Night Owl Cure","frequency":174,
            "description":"Natural anesthetic for rest","duration":45,"image":"🦉"}"#;

        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, TrackId(7));
        assert_eq!(track.frequency_hz, 174.0);
        assert_eq!(track.duration_minutes, 45);
        assert_eq!(track.icon, "🦉");
        assert_eq!(track.category, "");
        assert!(!track.is_recommended);
    }

    #[test]
    fn test_track_missing_duration_defaults() {
        let json = r#"{"id":1,"name":"Serenity Wave","frequencyHz":432}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(track.category_or_unknown(), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_recent_entry_is_flattened() {
        let json = r#"{"id":2,"name":"Zen Garden","frequency":528,"duration":25,
            "category":"Chill Vibes Only","playedAt":"2024-03-01T10:00:00Z"}"#;

        let entry: RecentEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.track.id, TrackId(2));
        assert_eq!(entry.track.category, "Chill Vibes Only");

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["name"], "Zen Garden");
        assert!(back.get("track").is_none());
        assert!(back["playedAt"].is_string());
    }

    #[test]
    fn test_favorites_view_partitions_recommended() {
        let popular = Track {
            id: TrackId(963),
            name: "Cosmic Crown".to_string(),
            frequency_hz: 963.0,
            description: String::new(),
            duration_minutes: 30,
            category: String::new(),
            icon: String::new(),
            is_recommended: true,
        };
        let mut own = popular.clone();
        own.id = TrackId(11);
        own.is_recommended = false;

        let view = FavoritesView::from_favorites(&[own.clone(), popular.clone()]);
        assert_eq!(view.recommended, vec![popular]);
        assert_eq!(view.user_favorites, vec![own]);
        assert_eq!(view.all.len(), 2);
    }
}
