//! Storage keys and maintenance helpers for the key-value backend.

use bridge_traits::KeyValueStore;
use tracing::{debug, warn};

/// Key holding the favorites collection.
pub const FAVORITES_KEY: &str = "@frequency_favorites";
/// Key holding the recent history.
pub const RECENT_KEY: &str = "@frequency_recent";
/// Key holding the settings map.
pub const SETTINGS_KEY: &str = "@app_settings";

/// Prefixes of every key the app writes.
const APP_KEY_PREFIXES: &[&str] = &["@frequency_", "@app_"];

/// Removes favorites, recent history, and settings from storage.
///
/// Returns `false` when the backend rejects the removal. In-memory copies
/// held by a running `LibraryStore` or `SettingsManager` are not touched.
pub async fn clear_all_data(store: &dyn KeyValueStore) -> bool {
    match store
        .remove_many(&[FAVORITES_KEY, RECENT_KEY, SETTINGS_KEY])
        .await
    {
        Ok(()) => {
            debug!("Cleared all app data");
            true
        }
        Err(e) => {
            warn!(error = %e, "Failed to clear app data");
            false
        }
    }
}

/// Total length in bytes of the values stored under app keys.
///
/// Backend failures are logged and reported as 0.
pub async fn storage_size(store: &dyn KeyValueStore) -> usize {
    let keys = match store.list_keys().await {
        Ok(keys) => keys,
        Err(e) => {
            warn!(error = %e, "Failed to list storage keys");
            return 0;
        }
    };

    let mut total = 0;
    for key in keys
        .iter()
        .filter(|key| APP_KEY_PREFIXES.iter().any(|prefix| key.starts_with(prefix)))
    {
        match store.get(key).await {
            Ok(Some(value)) => total += value.len(),
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read storage value");
                return 0;
            }
        }
    }
    total
}

/// Formats a byte count as `"N B"`, `"N.N KB"`, or `"N.N MB"`.
pub fn format_storage_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
