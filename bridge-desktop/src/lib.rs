//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! - `KeyValueStore` using an SQLite table via `sqlx`
//!
//! Tone output on desktop is provided by `core_playback::BufferedToneOutput`,
//! which renders the tone buffers in-process; hosts hand those buffers to the
//! platform mixer.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{default_database_path, SqliteKeyValueStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SqliteKeyValueStore::new(default_database_path()).await.unwrap();
//! }
//! ```

mod kv_store;

pub use kv_store::SqliteKeyValueStore;

use std::path::PathBuf;

const APP_DIR_NAME: &str = "frequency-player";
const DATABASE_FILE_NAME: &str = "storage.db";

/// Per-user data directory for the application.
///
/// Falls back to the current directory when the platform reports none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Default location of the key-value database.
pub fn default_database_path() -> PathBuf {
    default_data_dir().join(DATABASE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path_layout() {
        let path = default_database_path();
        assert!(path.ends_with("frequency-player/storage.db"));
    }
}
