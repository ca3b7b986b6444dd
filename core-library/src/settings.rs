//! Application settings
//!
//! A flat JSON map persisted under one key. Stored values are merged over the
//! defaults on first access; every write flushes the whole map.

use crate::error::Result;
use crate::storage::SETTINGS_KEY;
use bridge_traits::KeyValueStore;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Settings as a fresh install sees them.
pub fn default_settings() -> Map<String, Value> {
    let defaults = json!({
        "theme": "auto",
        "volume": 0.5,
        "backgroundAudio": false,
        "backgroundType": "white-noise",
        "hapticFeedback": true,
        "autoPlay": false,
        "defaultDuration": 30,
        "showOnboarding": true,
        "showHeadphoneWarning": true,
    });

    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Default)]
struct SettingsState {
    loaded: bool,
    values: Map<String, Value>,
}

/// Lazily loaded, write-through settings map.
pub struct SettingsManager {
    kv: Arc<dyn KeyValueStore>,
    event_bus: Option<EventBus>,
    state: Mutex<SettingsState>,
}

impl SettingsManager {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            event_bus: None,
            state: Mutex::new(SettingsState::default()),
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Loads stored settings over the defaults. Idempotent.
    pub async fn initialize(&self) {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        state.values.get(key).cloned()
    }

    pub async fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).await.and_then(|value| value.as_bool())
    }

    pub async fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).await.and_then(|value| value.as_f64())
    }

    pub async fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .await
            .and_then(|value| value.as_str().map(str::to_string))
    }

    /// Stores `value` under `key` and flushes the map.
    pub async fn set(&self, key: &str, value: impl Into<Value>) {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        state.values.insert(key.to_string(), value.into());
        self.persist(&state.values).await;
        drop(state);

        debug!(key, "Setting changed");
        self.emit(LibraryEvent::SettingChanged {
            key: key.to_string(),
        });
    }

    /// Copy of every setting.
    pub async fn all(&self) -> Map<String, Value> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        state.values.clone()
    }

    /// Restores the defaults and flushes them.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.values = default_settings();
        state.loaded = true;
        self.persist(&state.values).await;
    }

    async fn ensure_loaded(&self, state: &mut SettingsState) {
        if state.loaded {
            return;
        }

        let mut values = default_settings();
        match self.read_stored().await {
            Ok(Some(stored)) => values.extend(stored),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load settings, using defaults"),
        }

        state.values = values;
        state.loaded = true;
    }

    async fn read_stored(&self) -> Result<Option<Map<String, Value>>> {
        match self.kv.get(SETTINGS_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write_stored(&self, values: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string(values)?;
        self.kv.set(SETTINGS_KEY, &json).await?;
        Ok(())
    }

    async fn persist(&self, values: &Map<String, Value>) {
        if let Err(e) = self.write_stored(values).await {
            warn!(error = %e, "Failed to save settings");
        }
    }

    fn emit(&self, event: LibraryEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Library(event));
        }
    }
}
