//! # Core Configuration Module
//!
//! Provides configuration management for the frequency player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the injected bridges and the tunables of the playback
//! controller and library store. It enforces fail-fast validation so a host
//! that forgot to provide a capability learns about it at startup instead of
//! on the first button press.
//!
//! ## Required Dependencies
//!
//! - `KeyValueStore` - persistence for favorites, recent history, and settings
//! - `ToneOutput` - audio output for synthesized tones
//!
//! ## Optional Dependencies
//!
//! - `Clock` - time source (default: [`SystemClock`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .key_value_store(Arc::new(MyStore))
//!     .tone_output(Arc::new(MyToneOutput))
//!     .recent_capacity(20)
//!     .tone_settle_delay(Duration::from_millis(100))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioSessionOptions, Clock, KeyValueStore, SystemClock, ToneOutput};
use std::sync::Arc;
use std::time::Duration;

/// Default number of entries kept in the recent history.
pub const DEFAULT_RECENT_CAPACITY: usize = 20;

/// Upper bound accepted for the recent history capacity.
pub const MAX_RECENT_CAPACITY: usize = 500;

/// Default pause between unloading an old tone and starting the next one.
pub const DEFAULT_TONE_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Upper bound accepted for the settle delay.
pub const MAX_TONE_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Session volume before the user touches the slider.
pub const DEFAULT_INITIAL_VOLUME: f32 = 0.5;

/// Tunables for the playback controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Delay inserted after stopping the previous tone and before starting
    /// the next one; some platform outputs release the device asynchronously.
    pub tone_settle_delay: Duration,
    /// Volume of a freshly created session, in `0.0..=1.0`.
    pub initial_volume: f32,
    /// Options passed to `ToneOutput::configure_session`.
    pub session_options: AudioSessionOptions,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tone_settle_delay: DEFAULT_TONE_SETTLE_DELAY,
            initial_volume: DEFAULT_INITIAL_VOLUME,
            session_options: AudioSessionOptions::default(),
        }
    }
}

/// Tunables for the library store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Maximum number of entries kept in the recent history.
    pub recent_capacity: usize,
    /// Seed empty favorites storage with the popular frequencies.
    pub seed_popular_favorites: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            seed_popular_favorites: true,
        }
    }
}

/// Core configuration for the frequency player.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Persistence for favorites, recents, and settings (required)
    pub key_value_store: Arc<dyn KeyValueStore>,

    /// Audio output for tones (required)
    pub tone_output: Arc<dyn ToneOutput>,

    /// Wall-clock time source
    pub clock: Arc<dyn Clock>,

    pub playback: PlaybackConfig,

    pub library: LibraryConfig,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("key_value_store", &"KeyValueStore { ... }")
            .field("tone_output", &"ToneOutput { ... }")
            .field("clock", &"Clock { ... }")
            .field("playback", &self.playback)
            .field("library", &self.library)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Recent capacity is within `1..=MAX_RECENT_CAPACITY`
    /// - Settle delay does not exceed `MAX_TONE_SETTLE_DELAY`
    /// - Initial volume is within `0.0..=1.0`
    /// - Event buffer size is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.library.recent_capacity == 0 {
            return Err(Error::Config(
                "Recent history capacity must be greater than 0".to_string(),
            ));
        }

        if self.library.recent_capacity > MAX_RECENT_CAPACITY {
            return Err(Error::Config(format!(
                "Recent history capacity exceeds maximum of {}",
                MAX_RECENT_CAPACITY
            )));
        }

        if self.playback.tone_settle_delay > MAX_TONE_SETTLE_DELAY {
            return Err(Error::Config(format!(
                "Tone settle delay exceeds maximum of {:?}",
                MAX_TONE_SETTLE_DELAY
            )));
        }

        let volume = self.playback.initial_volume;
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(Error::Config(format!(
                "Initial volume {} must be between 0.0 and 1.0",
                volume
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn key_value_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "KeyValueStore".to_string(),
        message: "KeyValueStore implementation is required for favorites, recent history, \
                 and settings persistence. \
                 Desktop: use bridge_desktop::SqliteKeyValueStore or core_service::bootstrap_desktop. \
                 Mobile: inject an AsyncStorage/UserDefaults/SharedPreferences adapter."
            .to_string(),
    }
}

fn tone_output_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "ToneOutput".to_string(),
        message: "ToneOutput implementation is required for playback. \
                 Desktop: use core_playback::BufferedToneOutput. \
                 Mobile: inject the platform audio adapter."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    key_value_store: Option<Arc<dyn KeyValueStore>>,
    tone_output: Option<Arc<dyn ToneOutput>>,
    clock: Option<Arc<dyn Clock>>,
    playback: PlaybackConfig,
    library: LibraryConfig,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the key-value persistence implementation (required).
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    /// Sets the tone output implementation (required).
    pub fn tone_output(mut self, output: Arc<dyn ToneOutput>) -> Self {
        self.tone_output = Some(output);
        self
    }

    /// Sets the time source.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the delay between unloading a tone and starting the next one.
    ///
    /// Default: 100ms
    pub fn tone_settle_delay(mut self, delay: Duration) -> Self {
        self.playback.tone_settle_delay = delay;
        self
    }

    /// Sets the volume of a fresh playback session.
    ///
    /// Default: 0.5
    pub fn initial_volume(mut self, volume: f32) -> Self {
        self.playback.initial_volume = volume;
        self
    }

    /// Sets the options passed to the audio session on initialization.
    pub fn session_options(mut self, options: AudioSessionOptions) -> Self {
        self.playback.session_options = options;
        self
    }

    /// Sets the recent history capacity.
    ///
    /// Default: 20
    pub fn recent_capacity(mut self, capacity: usize) -> Self {
        self.library.recent_capacity = capacity;
        self
    }

    /// Enables or disables seeding empty favorites with the popular set.
    ///
    /// Default: true
    pub fn seed_popular_favorites(mut self, enabled: bool) -> Self {
        self.library.seed_popular_favorites = enabled;
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`]
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the `CoreConfig`, validating all required fields.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapabilityMissing` when a required bridge is absent and
    /// `Error::Config` when a tunable is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let key_value_store = self
            .key_value_store
            .ok_or_else(key_value_store_missing_error)?;
        let tone_output = self.tone_output.ok_or_else(tone_output_missing_error)?;

        let config = CoreConfig {
            key_value_store,
            tone_output,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            playback: self.playback,
            library: self.library,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
