//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (tone output and
//! key-value storage) into the shared Rust core and composes the playback
//! controller, the library store, and the settings manager around one event
//! bus. Desktop apps typically enable the `desktop-shims` feature (which
//! depends on `bridge-desktop`) and call [`bootstrap_desktop`].

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::KeyValueStore;
use core_library::{storage, LibraryStore, SettingsManager, Track};
use core_playback::{PlayRecorder, PlaybackController};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus};
use tokio::sync::broadcast::Receiver;
use tracing::{debug, info};

/// Records plays started by the controller into the recent history.
struct LibraryRecorder {
    library: Arc<LibraryStore>,
}

#[async_trait::async_trait]
impl PlayRecorder for LibraryRecorder {
    async fn record_play(&self, track: Track) {
        self.library.record_play(track).await;
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    key_value_store: Arc<dyn KeyValueStore>,
    events: EventBus,
    playback: PlaybackController,
    library: Arc<LibraryStore>,
    settings: Arc<SettingsManager>,
}

impl CoreService {
    /// Create a new service from a validated configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);

        let library = Arc::new(
            LibraryStore::new(
                config.key_value_store.clone(),
                config.clock.clone(),
                config.library,
            )
            .with_event_bus(events.clone()),
        );

        let settings = Arc::new(
            SettingsManager::new(config.key_value_store.clone()).with_event_bus(events.clone()),
        );

        let recorder: Arc<dyn PlayRecorder> = Arc::new(LibraryRecorder {
            library: library.clone(),
        });
        let playback = PlaybackController::new(
            config.tone_output.clone(),
            config.clock.clone(),
            config.playback,
            events.clone(),
            Some(recorder),
        );

        debug!(?config, "Core service created");

        Ok(Self {
            key_value_store: config.key_value_store,
            events,
            playback,
            library,
            settings,
        })
    }

    /// Configures the audio session and loads persisted state.
    pub async fn initialize(&self) {
        self.playback.initialize().await;
        self.library.initialize().await;
        self.settings.initialize().await;
        info!("Core service initialized");
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn library(&self) -> &LibraryStore {
        &self.library
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    /// Subscribe to playback and library events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Deletes all persisted app data. Loaded in-memory state is kept until
    /// the next launch.
    pub async fn clear_all_data(&self) -> bool {
        storage::clear_all_data(self.key_value_store.as_ref()).await
    }

    /// Bytes used by persisted app data.
    pub async fn storage_size(&self) -> usize {
        storage::storage_size(self.key_value_store.as_ref()).await
    }

    /// [`storage_size`](Self::storage_size) formatted for display.
    pub async fn formatted_storage_size(&self) -> String {
        storage::format_storage_size(self.storage_size().await)
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Persists to an SQLite database under the user data directory and renders
/// tones in-process.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let core = core_service::bootstrap_desktop().await?;
/// let favorites = core.library().list_favorites().await;
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop() -> Result<CoreService> {
    use bridge_desktop::{default_database_path, SqliteKeyValueStore};
    use core_playback::BufferedToneOutput;

    let store = SqliteKeyValueStore::new(default_database_path())
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let config = CoreConfig::builder()
        .key_value_store(Arc::new(store))
        .tone_output(Arc::new(BufferedToneOutput::new()))
        .build()?;

    let service = CoreService::new(config)?;
    service.initialize().await;
    Ok(service)
}
