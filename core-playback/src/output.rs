//! # Buffered Tone Output
//!
//! An in-process [`ToneOutput`] that renders each tone to a looping WAV
//! buffer and tracks handle state without touching audio hardware. Desktop
//! builds and tests use it; mobile hosts supply their own output.

use crate::tone::render_tone;
use bridge_traits::{
    AudioSessionOptions, BridgeError, Result as BridgeResult, ToneHandle, ToneOptions, ToneOutput,
};
use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tracing::{debug, instrument, trace};

/// Number of rendered buffers kept for reuse.
pub const TONE_CACHE_SIZE: usize = 50;

/// Observable state of a loaded tone.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneState {
    pub frequency_hz: f64,
    pub playing: bool,
    pub looping: bool,
    pub volume: f32,
    /// Rendered WAV loop
    pub buffer: Bytes,
}

/// Tone output that keeps everything in memory.
pub struct BufferedToneOutput {
    // keyed by the bit pattern of the frequency
    cache: Mutex<LruCache<u64, Bytes>>,
    tones: Mutex<HashMap<ToneHandle, ToneState>>,
    session: Mutex<Option<AudioSessionOptions>>,
}

impl BufferedToneOutput {
    pub fn new() -> Self {
        Self::with_cache_size(TONE_CACHE_SIZE)
    }

    pub fn with_cache_size(size: usize) -> Self {
        let capacity = NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            tones: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
        }
    }

    /// Handles that have been started and not unloaded.
    pub fn loaded_handles(&self) -> Vec<ToneHandle> {
        self.tones.lock().keys().copied().collect()
    }

    /// Number of loaded tones currently producing sound.
    pub fn playing_count(&self) -> usize {
        self.tones.lock().values().filter(|t| t.playing).count()
    }

    pub fn tone_state(&self, handle: ToneHandle) -> Option<ToneState> {
        self.tones.lock().get(&handle).cloned()
    }

    pub fn cached_buffers(&self) -> usize {
        self.cache.lock().len()
    }

    /// Options from the last `configure_session` call.
    pub fn session_options(&self) -> Option<AudioSessionOptions> {
        *self.session.lock()
    }

    fn buffer_for(&self, frequency_hz: f64) -> Bytes {
        let key = frequency_hz.to_bits();
        if let Some(buffer) = self.cache.lock().get(&key) {
            trace!(frequency_hz, "Tone buffer cache hit");
            return buffer.clone();
        }

        let buffer = render_tone(frequency_hz);
        self.cache.lock().put(key, buffer.clone());
        buffer
    }

    fn with_tone<T>(
        &self,
        handle: ToneHandle,
        f: impl FnOnce(&mut ToneState) -> T,
    ) -> BridgeResult<T> {
        self.tones
            .lock()
            .get_mut(&handle)
            .map(f)
            .ok_or_else(|| BridgeError::UnknownHandle(handle.to_string()))
    }
}

impl Default for BufferedToneOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ToneOutput for BufferedToneOutput {
    async fn configure_session(&self, options: AudioSessionOptions) -> BridgeResult<()> {
        *self.session.lock() = Some(options);
        Ok(())
    }

    #[instrument(skip(self, options))]
    async fn start_tone(&self, frequency_hz: f64, options: ToneOptions) -> BridgeResult<ToneHandle> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(BridgeError::Audio(format!(
                "cannot render frequency {}",
                frequency_hz
            )));
        }

        let buffer = self.buffer_for(frequency_hz);
        let handle = ToneHandle::new();
        self.tones.lock().insert(
            handle,
            ToneState {
                frequency_hz,
                playing: true,
                looping: options.looping,
                volume: options.volume.clamp(0.0, 1.0),
                buffer,
            },
        );

        debug!(%handle, "Tone started");
        Ok(handle)
    }

    async fn pause(&self, handle: ToneHandle) -> BridgeResult<()> {
        self.with_tone(handle, |tone| tone.playing = false)
    }

    async fn resume(&self, handle: ToneHandle) -> BridgeResult<()> {
        self.with_tone(handle, |tone| tone.playing = true)
    }

    async fn stop(&self, handle: ToneHandle) -> BridgeResult<()> {
        self.with_tone(handle, |tone| tone.playing = false)
    }

    async fn unload(&self, handle: ToneHandle) -> BridgeResult<()> {
        match self.tones.lock().remove(&handle) {
            Some(_) => Ok(()),
            None => Err(BridgeError::UnknownHandle(handle.to_string())),
        }
    }

    async fn set_volume(&self, handle: ToneHandle, volume: f32) -> BridgeResult<()> {
        self.with_tone(handle, |tone| tone.volume = volume.clamp(0.0, 1.0))
    }
}
