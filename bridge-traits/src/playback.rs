//! Tone output bridge trait and supporting types.
//!
//! The core never touches audio hardware. Host applications provide a
//! [`ToneOutput`] that can start a looping tone at a given frequency and
//! control it through an opaque [`ToneHandle`].

use crate::error::Result;
use std::fmt;
use uuid::Uuid;

/// How the host audio session should behave when other apps play audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionMode {
    /// Interrupt other audio sources.
    DoNotMix,
    /// Lower the volume of other audio sources.
    DuckOthers,
    /// Play alongside other audio sources.
    MixWithOthers,
}

/// Session-wide configuration applied once before any tone starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSessionOptions {
    /// Keep playing while the app is backgrounded.
    pub stays_active_in_background: bool,
    /// Ignore the hardware silent switch (iOS).
    pub plays_in_silent_mode: bool,
    /// Ask the platform to duck other audio (Android).
    pub duck_others: bool,
    /// Interruption policy.
    pub interruption: InterruptionMode,
}

impl Default for AudioSessionOptions {
    fn default() -> Self {
        Self {
            stays_active_in_background: true,
            plays_in_silent_mode: true,
            duck_others: true,
            interruption: InterruptionMode::DoNotMix,
        }
    }
}

/// Options supplied when a tone starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneOptions {
    /// Loop the tone buffer until stopped.
    pub looping: bool,
    /// Initial volume (0.0 = muted, 1.0 = unity gain).
    pub volume: f32,
}

impl Default for ToneOptions {
    fn default() -> Self {
        Self {
            looping: true,
            volume: 0.5,
        }
    }
}

/// Opaque identifier for a tone started by a [`ToneOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToneHandle(Uuid);

impl ToneHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ToneHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for platform audio outputs able to play synthesized tones.
///
/// Implementations must release the underlying resource on [`unload`]; the
/// core always calls `stop` followed by `unload` before starting a new tone.
///
/// [`unload`]: ToneOutput::unload
#[async_trait::async_trait]
pub trait ToneOutput: Send + Sync {
    /// Configure the platform audio session.
    async fn configure_session(&self, options: AudioSessionOptions) -> Result<()>;

    /// Start a tone at `frequency_hz` and return its handle.
    async fn start_tone(&self, frequency_hz: f64, options: ToneOptions) -> Result<ToneHandle>;

    /// Pause a tone without releasing it.
    async fn pause(&self, handle: ToneHandle) -> Result<()>;

    /// Resume a paused tone.
    async fn resume(&self, handle: ToneHandle) -> Result<()>;

    /// Stop a tone.
    async fn stop(&self, handle: ToneHandle) -> Result<()>;

    /// Release resources held by a tone.
    async fn unload(&self, handle: ToneHandle) -> Result<()>;

    /// Adjust volume. Volume is normalized to `0.0..=1.0`.
    async fn set_volume(&self, handle: ToneHandle, volume: f32) -> Result<()>;
}
